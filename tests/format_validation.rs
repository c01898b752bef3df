use filecrypt::codec::{unpack_cipher_file, unpack_key_file};
use filecrypt::{decrypt_file, encrypt_file, FileCryptError, FormatError};

#[test]
fn test_short_key_file() {
    let sealed = encrypt_file(b"x", "pw").unwrap();

    let result = decrypt_file(&sealed.cipher_file, &sealed.key_file[..75], "pw");
    assert!(matches!(
        result,
        Err(FileCryptError::Format(FormatError::KeyFileLength { expected: 76, actual: 75 }))
    ));
}

#[test]
fn test_short_cipher_file() {
    let sealed = encrypt_file(b"x", "pw").unwrap();

    let result = decrypt_file(&sealed.cipher_file[..27], &sealed.key_file, "pw");
    assert!(matches!(
        result,
        Err(FileCryptError::Format(FormatError::CipherFileTooShort { minimum: 28, actual: 27 }))
    ));
}

#[test]
fn test_empty_inputs() {
    assert!(matches!(unpack_key_file(&[]), Err(FileCryptError::Format(_))));
    assert!(matches!(unpack_cipher_file(&[]), Err(FileCryptError::Format(_))));
    assert!(matches!(decrypt_file(&[], &[], "pw"), Err(FileCryptError::Format(_))));
}

#[test]
fn test_format_error_is_not_authentication_failure() {
    let err = decrypt_file(&[0u8; 5], &[0u8; 5], "pw").unwrap_err();
    assert!(!matches!(err, FileCryptError::AuthenticationFailure));
    assert!(err.is_rejection());
}

#[test]
fn test_swapped_artifacts() {
    // Passing the key-file where the cipher-file belongs and vice versa.
    let sealed = encrypt_file(b"some longer content than a key", "pw").unwrap();
    let result = decrypt_file(&sealed.key_file, &sealed.cipher_file, "pw");
    assert!(matches!(result, Err(FileCryptError::Format(_))));
}
