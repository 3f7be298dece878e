pub mod aldrete;
pub mod apgar;
pub mod barthel;
pub mod bmi;
pub mod braden;
pub mod drip_rate;
pub mod glasgow;
pub mod insulin;
