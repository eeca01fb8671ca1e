use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("unknown node id: {0}")]
    UnknownNode(String),

    #[error("position for {id} is not finite: [{x}, {y}, {z}]")]
    NonFinitePosition { id: String, x: f64, y: f64, z: f64 },

    #[error("invalid layout config: {0}")]
    InvalidConfig(String),
}
