use curascan_core::error::CurascanError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), CurascanError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
