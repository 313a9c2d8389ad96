use tracing::{error, info};

use crate::error::{OperationError, Result};
use crate::mesh::{Compound, Solid};
use crate::operations::transform::Rotate;

/// Collects rotated copies of a solid about the Z axis.
///
/// Copy `i` (starting at zero) is rotated by `i * angle_offset`, so the
/// first copy is the input solid itself. The copies are gathered into a
/// [`Compound`]; overlapping copies are not fused.
pub struct RotatedComposite<'a> {
    solid: &'a Solid,
    copies: i32,
    angle_offset: f64,
}

impl<'a> RotatedComposite<'a> {
    /// Creates a new `RotatedComposite` operation.
    #[must_use]
    pub fn new(solid: &'a Solid, copies: i32, angle_offset: f64) -> Self {
        Self {
            solid,
            copies,
            angle_offset,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if fewer than one copy is
    /// requested.
    pub fn execute(&self) -> Result<Compound> {
        if self.copies < 1 {
            error!(copies = self.copies, "number of copies must be at least 1");
            return Err(OperationError::InvalidInput(format!(
                "number of copies must be at least 1, got {}",
                self.copies
            ))
            .into());
        }
        let mut compound = Compound::new();
        for i in 0..self.copies {
            let mut copy = self.solid.clone();
            Rotate::about_z(f64::from(i) * self.angle_offset).execute(&mut copy)?;
            compound.push(copy);
        }
        info!(copies = self.copies, "rotated composite created");
        Ok(compound)
    }
}
