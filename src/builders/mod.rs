pub mod ddpg;

pub use ddpg::DdpgBuilder;
