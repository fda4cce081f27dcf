pub mod analysis_processor;
pub mod fft_size;
pub mod fifo;
pub mod spectral_analyzer;
