pub mod rodio_tone_sink;
