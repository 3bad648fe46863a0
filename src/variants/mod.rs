mod lloyd;
mod sweep;

pub(crate) use lloyd::Lloyd;
pub(crate) use sweep::Sweep;
