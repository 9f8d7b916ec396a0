// polar-roll/src/bpolar/mod.rs

mod codec;
mod errors;
mod response_matrix;

pub use codec::{
    decode, decode_keyed, encode, read_bpolar_file, read_matrix, write_bpolar_file, write_matrix,
};
pub use errors::{BpolarError, MatrixDimension};
pub use response_matrix::ResponseMatrix;
