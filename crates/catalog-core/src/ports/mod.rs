//! Ports - 抽象化レイヤー
//!
//! 時刻、ハンドル生成、画像取り込みを trait として切り出し、
//! テストで差し替えられるようにします。

pub mod clock;
pub mod id_generator;
pub mod image_ingest;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{HandleGenerator, UlidHandleGenerator};
pub use self::image_ingest::ImageIngest;
