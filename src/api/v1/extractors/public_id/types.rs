/**
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *
 * 置かないもの
 *  - decode ロジック / extractor 実装 (core 側)
 */
use super::core::PublicId;

// records
pub enum RecordTag {}
pub type PublicRecordId = PublicId<RecordTag>;
