//! Golden digest vectors.
//!
//! Published known-answer values for every supported hash backend, so a
//! backend swap that changes output is caught before it reaches stored
//! `verifiedUsing` values.

use spdx_tu_core::HashAlgorithm;
use spdx_tu_integrity::digest;

/// A golden digest vector.
#[derive(Debug, Clone)]
pub struct DigestVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub algorithm: HashAlgorithm,
    pub input: &'static [u8],
    /// Expected digest (lowercase hex).
    pub expected: &'static str,
}

/// Get all golden digest vectors.
pub fn all_vectors() -> Vec<DigestVector> {
    vec![
        DigestVector {
            name: "sha1 abc",
            algorithm: HashAlgorithm::Sha1,
            input: b"abc",
            expected: "a9993e364706816aba3e25717850c26c9cd0d89d",
        },
        DigestVector {
            name: "sha224 abc",
            algorithm: HashAlgorithm::Sha224,
            input: b"abc",
            expected: "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7",
        },
        DigestVector {
            name: "sha256 abc",
            algorithm: HashAlgorithm::Sha256,
            input: b"abc",
            expected: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        },
        DigestVector {
            name: "sha384 abc",
            algorithm: HashAlgorithm::Sha384,
            input: b"abc",
            expected: "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed\
                       8086072ba1e7cc2358baeca134c825a7",
        },
        DigestVector {
            name: "sha512 abc",
            algorithm: HashAlgorithm::Sha512,
            input: b"abc",
            expected: "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                       2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
        },
        DigestVector {
            name: "sha3-224 abc",
            algorithm: HashAlgorithm::Sha3_224,
            input: b"abc",
            expected: "e642824c3f8cf24ad09234ee7d3c766fc9a3a5168d0c94ad73b46fdf",
        },
        DigestVector {
            name: "sha3-256 abc",
            algorithm: HashAlgorithm::Sha3_256,
            input: b"abc",
            expected: "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532",
        },
        DigestVector {
            name: "sha3-384 abc",
            algorithm: HashAlgorithm::Sha3_384,
            input: b"abc",
            expected: "ec01498288516fc926459f58e2c6ad8df9b473cb0fc08c2596da7cf0e49be4b2\
                       98d88cea927ac7f539f1edf228376d25",
        },
        DigestVector {
            name: "sha3-512 abc",
            algorithm: HashAlgorithm::Sha3_512,
            input: b"abc",
            expected: "b751850b1a57168a5693cd924b6b096e08f621827444f70d884f5d0240d2712e\
                       10e116e9192af3c91a7ec57647e3934057340b4cf408d5a56592f8274eec53f0",
        },
        DigestVector {
            name: "blake2b-256 abc",
            algorithm: HashAlgorithm::Blake2b256,
            input: b"abc",
            expected: "bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319",
        },
        DigestVector {
            name: "blake2b-512 abc",
            algorithm: HashAlgorithm::Blake2b512,
            input: b"abc",
            expected: "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
                       7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923",
        },
        DigestVector {
            name: "blake3 abc",
            algorithm: HashAlgorithm::Blake3,
            input: b"abc",
            expected: "6437b3ac38465133ffb63b75273a8db548c558465d79db03fd359c6cd5bd9d85",
        },
        DigestVector {
            name: "md2 abc",
            algorithm: HashAlgorithm::Md2,
            input: b"abc",
            expected: "da853b0d3f88d99b30283a69e6ded6bb",
        },
        DigestVector {
            name: "md4 abc",
            algorithm: HashAlgorithm::Md4,
            input: b"abc",
            expected: "a448017aaf21d8525fc10ae87aa6729d",
        },
        DigestVector {
            name: "md5 abc",
            algorithm: HashAlgorithm::Md5,
            input: b"abc",
            expected: "900150983cd24fb0d6963f7d28e17f72",
        },
    ]
}

/// Run every vector: (name, matches, computed hex or error).
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match digest(v.algorithm, v.input) {
            Ok(out) => {
                let hex = hex::encode(out);
                (v.name.to_string(), hex == v.expected, hex)
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}
