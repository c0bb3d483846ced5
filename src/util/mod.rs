pub mod fingerprint;
pub mod text;
pub mod url_norm;
