pub mod margin_measurer;
pub mod pause_cutter;
