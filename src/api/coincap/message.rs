use crate::core::context::PriceBatch;
use crate::error::CryptoWeatherError;

/// Decodes one push frame: a JSON object mapping asset id to price string,
/// e.g. `{"bitcoin":"29500.51","ethereum":"1800.23"}`.
///
/// Anything else is rejected as a whole so a bad frame never half-applies.
pub fn decode_prices(text: &str) -> Result<PriceBatch, CryptoWeatherError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(CryptoWeatherError::MalformedFrame(format!(
            "expected object, got {}",
            text
        )));
    }
    Ok(serde_json::from_value(value)?)
}
