pub mod date_codec;
pub mod seconds_codec;
pub mod wkt_codec;
