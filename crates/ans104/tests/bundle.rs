//! End-to-end bundle tests: build, parse, look up, verify, and load from disk.

use ans104::core::signer::InjectedEthereumSigner;
use ans104::core::{
    create_data, signer_from_secret, DataItem, DataItemOptions, Ed25519Signer, EthereumSigner,
    SignatureType, Signer,
};
use ans104::{bundle_and_sign, bundle_items, Bundle, BundleConfig, BundleError, ItemId};
use ans104_testkit::generators::{item_from_params, ItemParams};
use ans104_testkit::{arweave_signer, RejectingWallet, TestFixture};
use bytes::Bytes;
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn two_item_scenario() {
    init_tracing();
    let fixture = TestFixture::with_seed([0x42; 32]);
    let bundle = fixture.bundle(&[b"a", b"bb"]);

    assert_eq!(bundle.len(), 2);
    assert_eq!(bundle.sizes(), vec![117, 118]);
    assert_eq!(bundle.as_bytes().len(), 32 + 2 * 64 + 117 + 118);
    assert!(bundle.verify());

    let ids = bundle.ids();
    assert_eq!(ids[0].to_string(), "aELD7Qr2fVBEeeZFBOY-dBc1k7HJbmjblnOIxPcWLeo");
    assert_eq!(ids[1].to_string(), "1fndUXFXWT3_xzVU_xnrgJEsDuchJZ_Vqvp0YcgFBro");
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(bundle.get(i).unwrap().id(), *id);
    }
}

#[test]
fn zeroed_signature_fails_verify() {
    init_tracing();
    let fixture = TestFixture::with_seed([0x42; 32]);

    for zeroed in 0..2 {
        let mut items = vec![
            fixture.signed_item(b"a", DataItemOptions::default()),
            fixture.signed_item(b"bb", DataItemOptions::default()),
        ];
        let id = items[zeroed].id();
        let bundle = bundle_items(&items).unwrap();
        assert!(bundle.verify());

        // Zero the signature inside the binary, keeping the header id.
        let mut binary = bundle.as_bytes().to_vec();
        let offset = 32 + 2 * 64 + if zeroed == 0 { 0 } else { 117 };
        binary[offset + 2..offset + 2 + 64].fill(0);
        let tampered = Bundle::from_bytes(binary).unwrap();
        assert_eq!(tampered.ids()[zeroed], id);
        assert!(!tampered.verify());

        // A zeroed signature also cannot be bundled in the first place.
        items[zeroed].signature = Bytes::from(vec![0u8; 64]);
        assert!(matches!(
            bundle_items(&items),
            Err(BundleError::Codec(ans104::core::CodecError::MissingDataItemId))
        ));
    }
}

#[test]
fn header_id_must_match_signature() {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let bundle = fixture.bundle(&[b"a"]);

    let mut binary = bundle.as_bytes().to_vec();
    binary[32 + 32] ^= 0x01;
    let tampered = Bundle::from_bytes(binary).unwrap();
    assert!(tampered.get(0).unwrap().is_valid());
    assert!(!tampered.verify());
}

#[test]
fn oversized_count_is_invalid_bundle() {
    let mut binary = vec![0u8; 32];
    binary[0] = 10;
    binary.extend_from_slice(&[0u8; 64]);
    assert!(matches!(
        Bundle::from_bytes(binary),
        Err(BundleError::InvalidBundle(_))
    ));
}

#[test]
fn lookup_by_id_string() {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let bundle = fixture.bundle(&[b"a", b"bb", b"ccc"]);

    let id: ItemId = bundle.ids()[2].to_string().parse().unwrap();
    assert_eq!(bundle.get_by_id(&id).unwrap().data.as_ref(), b"ccc");

    let missing = ItemId::from_bytes([0u8; 32]);
    assert!(matches!(
        bundle.get_by_id(&missing),
        Err(BundleError::TransactionNotFound(_))
    ));
}

#[tokio::test]
async fn mixed_schemes_bundle() {
    let mut ed = Ed25519Signer::from_seed(&[1u8; 32]);
    let mut eth = EthereumSigner::from_secret(&[2u8; 32]).unwrap();

    let mut a = create_data(b"a".to_vec(), &ed, DataItemOptions::default()).unwrap();
    a.sign(&mut ed).await.unwrap();
    let mut b = create_data(
        b"bb".to_vec(),
        &eth,
        DataItemOptions::default().tag("Content-Type", "text/plain"),
    )
    .unwrap();
    b.sign(&mut eth).await.unwrap();

    let bundle = bundle_items(&[a, b]).unwrap();
    assert_eq!(bundle.sizes()[0], 117);
    assert!(bundle.verify());

    let items = bundle.items().unwrap();
    assert_eq!(items[1].owner.len(), 65);
    assert_eq!(items[1].tags[0].value, "text/plain");
}

#[tokio::test]
async fn arweave_item_in_mixed_bundle() {
    init_tracing();
    let der = arweave_signer().to_pkcs8_der().unwrap();
    let mut signer = signer_from_secret(1, &der).unwrap();
    assert_eq!(signer.signature_type(), SignatureType::Arweave);
    assert_eq!(signer.public_key(), arweave_signer().public_key());

    let options = DataItemOptions::default()
        .tag("Content-Type", "text/plain")
        .tag("App-Name", "arweave")
        .target(vec![0x11; 32])
        .anchor(vec![0x22; 32]);
    let mut item = create_data(b"signed with rsa".to_vec(), &signer, options).unwrap();
    item.sign(&mut signer).await.unwrap();

    assert_eq!(item.signature.len(), 512);
    assert_eq!(item.owner.len(), 512);
    // The owner is the full-width modulus; a 4096-bit modulus has its top bit set.
    assert!(item.owner[0] & 0x80 != 0);
    assert!(item.is_valid());

    let raw = item.to_bytes().unwrap();
    assert_eq!(&raw[..2], &[0x01, 0x00]);
    assert_eq!(raw.len(), item.encoded_len());
    assert_eq!(raw[2 + 512 + 512], 1);

    let decoded = DataItem::from_bytes(raw).unwrap();
    assert_eq!(decoded, item);
    assert!(decoded.is_valid());

    let fixture = TestFixture::with_seed([0x42; 32]);
    let ed = fixture.signed_item(b"a", DataItemOptions::default());
    let bundle = bundle_items(&[decoded, ed]).unwrap();

    assert_eq!(bundle.sizes(), vec![item.encoded_len(), 117]);
    assert!(bundle.verify());
    assert_eq!(bundle.get(0).unwrap().signature_type, SignatureType::Arweave);
    assert_eq!(bundle.get_by_id(&item.id()).unwrap().tags, item.tags);
}

#[tokio::test]
async fn injected_signer_bundle() {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let mut signer = InjectedEthereumSigner::new(fixture.wallet());

    // Keyless: the owner is filled in when the item is signed.
    let item = create_data(b"from wallet".to_vec(), &signer, DataItemOptions::default()).unwrap();
    assert!(item.owner.is_empty());

    let bundle = bundle_and_sign(vec![item], &mut signer).await.unwrap();
    assert!(bundle.verify());
    assert_eq!(
        bundle.get(0).unwrap().owner.as_ref(),
        fixture.ethereum.public_key()
    );
    // One challenge signature plus one item signature.
    assert_eq!(signer.wallet().calls(), 2);
}

#[tokio::test]
async fn declined_wallet_aborts_bundle() {
    let mut signer = InjectedEthereumSigner::new(RejectingWallet::declining());
    let item = create_data(b"x".to_vec(), &signer, DataItemOptions::default()).unwrap();

    let err = bundle_and_sign(vec![item], &mut signer).await.unwrap_err();
    assert!(err.is_user_declined());
}

#[tokio::test]
async fn open_from_file() {
    let fixture = TestFixture::with_seed([0x42; 32]);
    let bundle = fixture.bundle(&[b"a", b"bb"]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.bin");
    std::fs::write(&path, bundle.as_bytes()).unwrap();

    let loaded = Bundle::open_with_config(&path, &BundleConfig::verified())
        .await
        .unwrap();
    assert_eq!(loaded.ids(), bundle.ids());

    let missing = dir.path().join("missing.bin");
    assert!(matches!(
        Bundle::open(&missing).await,
        Err(BundleError::Io(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn structural_invariants(params in prop::collection::vec(any::<ItemParams>(), 0..6)) {
        let items: Vec<_> = params.iter().map(item_from_params).collect();
        let bundle = bundle_items(&items).unwrap();

        prop_assert_eq!(bundle.len(), items.len());
        prop_assert_eq!(bundle.ids().len(), items.len());
        let total: usize = bundle.sizes().iter().sum();
        prop_assert_eq!(32 + 64 * items.len() + total, bundle.as_bytes().len());

        for (i, item) in items.iter().enumerate() {
            prop_assert_eq!(bundle.get(i).unwrap().id(), bundle.ids()[i]);
            prop_assert_eq!(bundle.ids()[i], item.id());
            prop_assert_eq!(bundle.sizes()[i], item.encoded_len());
        }
        prop_assert!(bundle.verify());
    }

    #[test]
    fn lookup_equivalence(params in prop::collection::vec(any::<ItemParams>(), 1..6)) {
        let items: Vec<_> = params.iter().map(item_from_params).collect();
        let bundle = bundle_items(&items).unwrap();

        for (i, id) in bundle.ids().iter().enumerate() {
            let first = bundle.position(id).unwrap();
            prop_assert!(first <= i);
            prop_assert_eq!(bundle.get_raw_by_id(id).unwrap(), bundle.get_raw(first).unwrap());
        }
    }
}
