pub mod directory;
pub mod record;
