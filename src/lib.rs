//! Vet DX Core - disease category prediction from lab panels
//!
//! Form values → validated record → scaled measurements → ordered feature
//! vector → classifier code → [`DiseaseCategory`](logic::model::DiseaseCategory).

pub mod api;
pub mod constants;
pub mod logic;
