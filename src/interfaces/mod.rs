//! Outer surfaces: the request façade and the CSV batch driver's I/O.

pub mod csv;
pub mod facade;
pub mod response_writer;
