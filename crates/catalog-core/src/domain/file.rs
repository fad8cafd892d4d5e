//! RawFile - form の file input から受け取ったファイル

use std::fmt;
use std::sync::Arc;

/// pipeline と registry で共有するエンコード済み画像の bytes
///
/// フォールバック時に元の bytes をコピーせず登録できるよう `Arc<[u8]>`。
pub type ImageBytes = Arc<[u8]>;

/// ユーザーが選択したファイル
///
/// 空の bytes でも「ファイルあり」。デコードに失敗し、pipeline の
/// フォールバック経路に入る。
#[derive(Clone)]
pub struct RawFile {
    pub name: String,
    pub bytes: ImageBytes,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<ImageBytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// bytes の中身はログに出さない
impl fmt::Debug for RawFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
