// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use epassport_common::{HashAlgorithm, ObjectIdentifier};

#[test]
fn known_answer_digests() {
    assert_eq!(
        hex::encode(HashAlgorithm::Sha1.digest(b"abc")),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_eq!(
        hex::encode(HashAlgorithm::Sha256.digest(b"abc")),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn oid_round_trips_through_lookup() {
    for alg in HashAlgorithm::ALL {
        let oid = ObjectIdentifier::new(alg.oid());
        assert_eq!(HashAlgorithm::from_oid(&oid), Some(alg));
        assert_eq!(oid.to_string().parse::<HashAlgorithm>().unwrap(), alg);
    }
}
