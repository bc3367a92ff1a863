// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end behaviour of vault files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use coffer_core::{CofferError, CorruptReason};
use coffer_vault::kdf::{self, KdfCost, KdfParams};
use coffer_vault::{container, persist, repository};
use coffer_vault::{Entry, EntryKind, FileRepository, Session, SessionOptions};
use coffer_vault::model::LoginData;
use secrecy::SecretString;

const FAST: KdfCost = KdfCost {
    iterations: 1,
    memory_kib: 8 * 1024,
    parallelism: 1,
};

fn options() -> SessionOptions {
    SessionOptions {
        kdf_cost: FAST,
        ..SessionOptions::default()
    }
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn vault_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("coffer").join("vault.enc")
}

#[test]
fn create_add_save_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);

    {
        let mut session = Session::new(FileRepository::new(&path), options());
        let vault = session.create_vault(&secret("CorrectHorse1!")).unwrap();
        let github = Entry::new(
            "GitHub",
            EntryKind::Login(LoginData {
                username: Some("octocat".into()),
                password: Some("gh-p4ssw0rd".into()),
                uri: Some("https://github.com".into()),
                totp_secret: None,
            }),
        )
        .unwrap();
        vault.add_entry(github).unwrap();
        session.save().unwrap();
    }

    // A fresh session stands in for a new process.
    let mut session = Session::new(FileRepository::new(&path), options());
    let vault = session.unlock(&secret("CorrectHorse1!")).unwrap();
    let entry = vault.find_entry_by_name("GitHub").unwrap();
    assert_eq!(entry.username(), Some("octocat"));
    assert_eq!(entry.password(), Some("gh-p4ssw0rd"));
    assert_eq!(entry.uri(), Some("https://github.com"));
    session.lock();

    let mut session = Session::new(FileRepository::new(&path), options());
    let err = session.unlock(&secret("WrongPassword")).unwrap_err();
    assert!(matches!(err, CofferError::DecryptionFailed));
    assert_eq!(err.to_string(), "wrong password or corrupted file");
}

#[test]
fn unlock_requires_stored_params() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);
    let mut session = Session::new(FileRepository::new(&path), options());
    session.create_vault(&secret("CorrectHorse1!")).unwrap();
    session.lock();

    // Right password, freshly generated parameters: must not decrypt.
    let fresh = KdfParams::generate(FAST).unwrap();
    let wrong_key = kdf::derive_key(b"CorrectHorse1!", &fresh).unwrap();
    let repo = FileRepository::new(&path);
    assert!(matches!(repo.load(&wrong_key), Err(CofferError::DecryptionFailed)));

    // Right password with the stored parameters does.
    let stored = repo.load_params().unwrap();
    let key = kdf::derive_key(b"CorrectHorse1!", &stored).unwrap();
    assert!(repo.load(&key).is_ok());
}

#[test]
fn crash_between_write_and_rename_keeps_old_vault() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);
    let mut session = Session::new(FileRepository::new(&path), options());
    session.create_vault(&secret("CorrectHorse1!")).unwrap();
    let original = fs::read(&path).unwrap();

    let params = KdfParams::generate(FAST).unwrap();
    let key = kdf::derive_key(b"other", &params).unwrap();
    let replacement = repository::seal_vault(session.vault().unwrap(), &key, &params).unwrap();

    // Stage the write and drop it without committing.
    let staged = persist::stage(&path, &replacement).unwrap();
    drop(staged);

    assert_eq!(fs::read(&path).unwrap(), original);
    session.lock();
    assert!(session.unlock(&secret("CorrectHorse1!")).is_ok());
}

#[test]
fn completed_rename_leaves_new_vault_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);
    let mut session = Session::new(FileRepository::new(&path), options());
    session.create_vault(&secret("CorrectHorse1!")).unwrap();

    let params = KdfParams::generate(FAST).unwrap();
    let key = kdf::derive_key(b"replacement-pw", &params).unwrap();
    let replacement = repository::seal_vault(session.vault().unwrap(), &key, &params).unwrap();

    persist::stage(&path, &replacement).unwrap().commit().unwrap();

    assert_eq!(fs::read(&path).unwrap(), replacement);
    assert!(FileRepository::new(&path).load(&key).is_ok());
}

#[test]
fn unsupported_version_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);
    let mut session = Session::new(FileRepository::new(&path), options());
    session.create_vault(&secret("CorrectHorse1!")).unwrap();
    session.lock();

    let mut bytes = fs::read(&path).unwrap();
    bytes[8..12].copy_from_slice(&2u32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let err = session.unlock(&secret("CorrectHorse1!")).unwrap_err();
    assert!(matches!(
        err,
        CofferError::CorruptVault(CorruptReason::BadVersion(2))
    ));
}

#[test]
fn truncated_file_is_reported_not_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);
    let mut session = Session::new(FileRepository::new(&path), options());
    session.create_vault(&secret("CorrectHorse1!")).unwrap();
    session.lock();

    let bytes = fs::read(&path).unwrap();
    let params_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;

    // Cut inside the params record.
    fs::write(&path, &bytes[..container::MIN_LEN + params_len / 2]).unwrap();
    assert!(matches!(
        session.unlock(&secret("CorrectHorse1!")),
        Err(CofferError::CorruptVault(CorruptReason::TruncatedParams))
    ));

    // Cut inside the sealed payload.
    fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();
    assert!(matches!(
        session.unlock(&secret("CorrectHorse1!")),
        Err(CofferError::DecryptionFailed)
    ));
}

#[test]
fn stored_params_are_readable_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);
    let mut session = Session::new(FileRepository::new(&path), options());
    session.create_vault(&secret("CorrectHorse1!")).unwrap();

    let bytes = fs::read(&path).unwrap();
    let params: serde_json::Value =
        serde_json::from_slice(container::peek_params(&bytes).unwrap()).unwrap();
    assert_eq!(params["algorithm"], "argon2id");
    assert_eq!(params["iterations"], 1);
    assert_eq!(params["memory"], 8192);
    assert_eq!(params["key_length"], 32);
}

/// Overwrite one field of the stored KDF parameters, keeping the payload.
fn tamper_params(path: &Path, field: &str, value: u64) {
    let bytes = fs::read(path).unwrap();
    let container = container::decode(&bytes).unwrap();
    let mut params: serde_json::Value = serde_json::from_slice(container.params).unwrap();
    params[field] = value.into();
    let params = serde_json::to_vec(&params).unwrap();
    let rewritten = container::encode(&params, container.sealed).unwrap();
    fs::write(path, rewritten).unwrap();
}

#[test]
fn absurd_kdf_cost_in_header_is_corruption() {
    let cases = [
        ("memory", 4_000_000_000),
        ("memory", u64::from(kdf::MAX_MEMORY_KIB) + 1),
        ("iterations", 1000),
        ("parallelism", 4096),
    ];
    for (field, value) in cases {
        let dir = tempfile::tempdir().unwrap();
        let path = vault_path(&dir);
        let mut session = Session::new(FileRepository::new(&path), options());
        session.create_vault(&secret("CorrectHorse1!")).unwrap();
        session.lock();

        tamper_params(&path, field, value);
        let err = session.unlock(&secret("CorrectHorse1!")).unwrap_err();
        assert!(
            matches!(err, CofferError::CorruptVault(CorruptReason::MalformedParams(_))),
            "{field}={value}: {err:?}"
        );
        assert!(!session.is_unlocked());
    }
}

#[test]
fn oversized_cost_is_refused_at_creation() {
    let dir = tempfile::tempdir().unwrap();
    let path = vault_path(&dir);
    let options = SessionOptions {
        kdf_cost: KdfCost {
            iterations: kdf::MAX_ITERATIONS + 1,
            ..FAST
        },
        ..SessionOptions::default()
    };
    let mut session = Session::new(FileRepository::new(&path), options);
    assert!(session.create_vault(&secret("CorrectHorse1!")).is_err());
    assert!(!path.exists());
}
