pub mod nfc;

pub use nfc::NfcConfig;
