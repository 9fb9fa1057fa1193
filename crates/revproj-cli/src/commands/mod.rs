pub mod normalize;
pub mod projection;
pub mod samples;
