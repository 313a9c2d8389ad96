mod make_box;
mod rotated_composite;

pub use make_box::MakeBox;
pub use rotated_composite::RotatedComposite;
