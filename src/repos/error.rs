/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - 中身は handler で 500 (CollaboratorFailure) に畳む。呼び出し側へは出さない
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
}
