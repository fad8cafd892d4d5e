//! BlobHandle - メモリ上のバイナリを指す不透明なハンドル
//!
//! # ULID ベースのハンドル
//! ハンドルは ULID (timestamp + 80-bit random) を包んだ値です。
//! - **推測不能**: ランダム部分があるため、他のハンドルから推測できない
//! - **プロセスローカル**: ファイルパスではなく、再起動を跨いで意味を持たない
//! - **シリアライズ不可**: `Serialize` をあえて実装しない
//!
//! 表示形式はブラウザの object URL に倣って `blob:catalog/<ULID>` とします。

use std::fmt;
use ulid::Ulid;

/// Display で使うプレフィックス
pub const BLOB_HANDLE_PREFIX: &str = "blob:catalog/";

/// BlobHandle は BlobHandleRegistry が発行する参照
///
/// 所有権は registry にあり、ProductRecord は参照として保持するだけです。
/// release された後のハンドルでバイトを取得しても `None` になります。
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobHandle {
    ulid: Ulid,
}

impl BlobHandle {
    /// ULID から BlobHandle を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self { ulid }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    /// `blob:catalog/<ULID>` 形式の文字列からハンドルを復元
    ///
    /// 復元できても registry 上で live とは限らない。
    pub fn parse(value: &str) -> Option<Self> {
        let raw = value.strip_prefix(BLOB_HANDLE_PREFIX)?;
        Ulid::from_string(raw).ok().map(Self::from_ulid)
    }
}

impl From<Ulid> for BlobHandle {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", BLOB_HANDLE_PREFIX, self.ulid)
    }
}
