// Vault protocol benchmarks.
//
// Covers PDA derivation (the bump search dominates), CreateVault encoding,
// account decoding, and message compilation plus signing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fansphere_protocol::address::Address;
use fansphere_protocol::config::{ProgramConfig, FANSPHERE_PROGRAM_ID};
use fansphere_protocol::crypto::Keypair;
use fansphere_protocol::instruction::vault::create_vault;
use fansphere_protocol::pda::derive_vault_address;
use fansphere_protocol::state::VaultAccountRecord;
use fansphere_protocol::transaction::{assemble, sign_transaction, Checkpoint};

fn bench_derive_vault_address(c: &mut Criterion) {
    let maker = Address::new_from_array([7u8; 32]);

    // Seed 888 resolves at bump 255; seed 5 walks down to 252.
    let mut group = c.benchmark_group("pda/derive_vault_address");
    for seed in [888u64, 5] {
        group.bench_with_input(BenchmarkId::from_parameter(seed), &seed, |b, &seed| {
            b.iter(|| derive_vault_address(black_box(&maker), seed, &FANSPHERE_PROGRAM_ID));
        });
    }
    group.finish();
}

fn bench_encode_create_vault(c: &mut Criterion) {
    let config = ProgramConfig::default();
    let maker = Address::new_from_array([7u8; 32]);
    let mint = Address::new_from_array([8u8; 32]);
    let hash = [1u8; 32];

    c.bench_function("codec/create_vault", |b| {
        b.iter(|| create_vault(&config, &maker, &mint, black_box(888), 50, &hash));
    });
}

fn bench_decode_account(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/decode");
    for space in [49usize, 114, 1024] {
        let bytes = vec![1u8; space];
        group.throughput(Throughput::Bytes(space as u64));
        group.bench_with_input(BenchmarkId::from_parameter(space), &bytes, |b, bytes| {
            b.iter(|| VaultAccountRecord::decode(black_box(bytes)));
        });
    }
    group.finish();
}

fn bench_assemble_and_sign(c: &mut Criterion) {
    let config = ProgramConfig::default();
    let maker = Keypair::generate();
    let mint = Address::new_from_array([8u8; 32]);
    let ix = create_vault(&config, &maker.address(), &mint, 888, 50, &[1u8; 32])
        .unwrap();

    c.bench_function("transaction/assemble", |b| {
        b.iter(|| assemble(vec![ix.clone()], &maker.address(), Checkpoint::default()));
    });

    let tx = assemble(vec![ix], &maker.address(), Checkpoint::default())
        .unwrap();
    c.bench_function("transaction/sign", |b| {
        b.iter(|| sign_transaction(black_box(&tx), &[&maker]));
    });
}

criterion_group!(
    benches,
    bench_derive_vault_address,
    bench_encode_create_vault,
    bench_decode_account,
    bench_assemble_and_sign,
);
criterion_main!(benches);
