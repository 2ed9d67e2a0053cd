//! Digest backends and package verification codes.

use blake2::digest::consts::{U32, U48};
use blake2::{Blake2b, Blake2b512};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use spdx_tu_core::HashAlgorithm;

use crate::error::{IntegrityError, Result};

/// Hash `data` with `algorithm`.
///
/// Package verification code algorithms treat `data` as a single member.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>> {
    let out = match algorithm {
        HashAlgorithm::Sha1 => hash_with::<Sha1>(data),
        HashAlgorithm::Sha224 => hash_with::<Sha224>(data),
        HashAlgorithm::Sha256 => hash_with::<Sha256>(data),
        HashAlgorithm::Sha384 => hash_with::<Sha384>(data),
        HashAlgorithm::Sha512 => hash_with::<Sha512>(data),
        HashAlgorithm::Sha3_224 => hash_with::<Sha3_224>(data),
        HashAlgorithm::Sha3_256 => hash_with::<Sha3_256>(data),
        HashAlgorithm::Sha3_384 => hash_with::<Sha3_384>(data),
        HashAlgorithm::Sha3_512 => hash_with::<Sha3_512>(data),
        HashAlgorithm::Blake2b256 => hash_with::<Blake2b<U32>>(data),
        HashAlgorithm::Blake2b384 => hash_with::<Blake2b<U48>>(data),
        HashAlgorithm::Blake2b512 => hash_with::<Blake2b512>(data),
        HashAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        HashAlgorithm::Md2 => hash_with::<md2::Md2>(data),
        HashAlgorithm::Md4 => hash_with::<md4::Md4>(data),
        HashAlgorithm::Md5 => hash_with::<md5::Md5>(data),
        HashAlgorithm::Md6 => md6_with(128, data)?,
        HashAlgorithm::SpdxPvcSha1 | HashAlgorithm::SpdxPvcSha256 => {
            return package_verification_code(algorithm, [data]);
        }
    };
    debug_assert_eq!(out.len(), algorithm.digest_len());
    Ok(out)
}

/// SPDX package verification code over a set of members.
///
/// Each member is hashed with the code's base algorithm (sha1 or sha256);
/// the lowercase hex digests are sorted, concatenated and hashed again.
/// Member order does not affect the result.
pub fn package_verification_code<'a>(
    algorithm: HashAlgorithm,
    members: impl IntoIterator<Item = &'a [u8]>,
) -> Result<Vec<u8>> {
    let base = match algorithm {
        HashAlgorithm::SpdxPvcSha1 => HashAlgorithm::Sha1,
        HashAlgorithm::SpdxPvcSha256 => HashAlgorithm::Sha256,
        other => return Err(IntegrityError::Unsupported(other)),
    };

    let mut hexes = members
        .into_iter()
        .map(|m| digest(base, m).map(hex::encode))
        .collect::<Result<Vec<_>>>()?;
    hexes.sort();
    digest(base, hexes.concat().as_bytes())
}

fn hash_with<D: Digest>(data: &[u8]) -> Vec<u8> {
    D::digest(data).to_vec()
}

/// MD6 with default parameters at `bits` output length.
fn md6_with(bits: usize, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; bits / 8];
    md6::hash(bits as i32, data, &mut out)
        .map_err(|e| IntegrityError::Backend(format!("md6-{}: {:?}", bits, e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(algorithm: HashAlgorithm, data: &[u8]) -> String {
        hex::encode(digest(algorithm, data).unwrap())
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            hex_of(HashAlgorithm::Sha1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Sha3_256, b"abc"),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Md5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Md4, b"abc"),
            "a448017aaf21d8525fc10ae87aa6729d"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Md2, b"abc"),
            "da853b0d3f88d99b30283a69e6ded6bb"
        );
        assert_eq!(
            hex_of(HashAlgorithm::Blake3, b"abc"),
            "6437b3ac38465133ffb63b75273a8db548c558465d79db03fd359c6cd5bd9d85"
        );
    }

    #[test]
    fn test_lengths_match_declarations() {
        for algorithm in HashAlgorithm::ALL {
            let out = digest(algorithm, b"spdx").unwrap();
            assert_eq!(out.len(), algorithm.digest_len(), "{}", algorithm);
        }
    }

    #[test]
    fn test_md6_backend() {
        // reference "abc" vector at 256 bits
        assert_eq!(
            hex::encode(md6_with(256, b"abc").unwrap()),
            "230637d4e6845cf0d092b558e87625f03881dd53a7439da34cf3b94ed0d8b2c5"
        );

        let md6_128 = digest(HashAlgorithm::Md6, b"abc").unwrap();
        assert_eq!(md6_128, md6_with(128, b"abc").unwrap());
        assert_eq!(md6_128.len(), 16);
        assert_ne!(md6_128, digest(HashAlgorithm::Md6, b"abd").unwrap());
    }

    #[test]
    fn test_pvc_is_order_independent() {
        let a: &[u8] = b"file-a";
        let b: &[u8] = b"file-b";
        let forward = package_verification_code(HashAlgorithm::SpdxPvcSha1, [a, b]).unwrap();
        let backward = package_verification_code(HashAlgorithm::SpdxPvcSha1, [b, a]).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 20);
    }

    #[test]
    fn test_pvc_single_member() {
        let sha1_hex = hex_of(HashAlgorithm::Sha1, b"abc");
        let expected = digest(HashAlgorithm::Sha1, sha1_hex.as_bytes()).unwrap();
        assert_eq!(digest(HashAlgorithm::SpdxPvcSha1, b"abc").unwrap(), expected);
    }

    #[test]
    fn test_pvc_rejects_plain_algorithm() {
        let empty: [&[u8]; 0] = [];
        assert!(package_verification_code(HashAlgorithm::Sha256, empty).is_err());
    }
}
