//! Mesh file formats.
//!
//! Every codec is generic over [`std::io::Read`]/[`std::io::Write`]; the
//! `*_file` variants open the path, buffer it and flush before returning.

mod off;
mod ply;
mod stl;

pub use off::{
    read_off, read_off_file, read_off_polyhedron, read_off_polyhedron_file, write_off,
    write_off_file,
};
pub use ply::{write_ply, write_ply_file};
pub use stl::{read_stl, read_stl_file, write_stl, write_stl_file};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use crate::error::{ParseError, Result};

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Parses one whitespace-separated token, naming `what` in the error.
fn parse_token<T: FromStr>(
    token: Option<&str>,
    line: usize,
    what: &str,
) -> Result<T, ParseError> {
    let token = token.ok_or_else(|| ParseError::new(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| ParseError::new(line, format!("invalid {what} `{token}`")))
}
