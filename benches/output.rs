// SPDX-License-Identifier: Apache-2.0

use std::mem;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quire::sink::void_sink;
use quire::{OutputStream, StreamOptions, DEFAULT_PAGE_SIZE};

const DATA: &[u8] = &[0x5a; 64 * 1024];

fn write_slice(c: &mut Criterion) {
	c.bench_function("write_slice", |b| b.iter(|| {
		let mut out = OutputStream::memory();
		out.write_slice(DATA).unwrap();
		out.take_output()
	}));
}

fn write_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("write_numbers");

	macro_rules! gen {
		($($fn:ident $ty:ident),+) => {
			$(
			group.bench_function(stringify!($fn), |b| b.iter(|| {
				let mut out = OutputStream::memory();
				for _ in 0..DEFAULT_PAGE_SIZE / mem::size_of::<$ty>() {
					let _ = black_box(out.$fn($ty::MAX));
				}
				out.take_output()
			}));
			)+
		};
	}

	gen!(
		write_u16 u16,
		write_u16_le u16,
		write_u32 u32,
		write_u32_le u32,
		write_u64 u64,
		write_u64_le u64
	);
}

fn drain_to_void(c: &mut Criterion) {
	c.bench_function("drain_to_void", |b| b.iter(|| {
		let mut out = OutputStream::with_sink(void_sink(), StreamOptions::default());
		for chunk in DATA.chunks(1000) {
			out.write_slice(chunk).unwrap();
		}
		out.flush().unwrap();
	}));
}

fn reserve_and_backfill(c: &mut Criterion) {
	c.bench_function("reserve_and_backfill", |b| b.iter(|| {
		let mut out = OutputStream::memory();
		for chunk in DATA.chunks(1000) {
			let cursor = out.reserve_fixed(8);
			out.write_slice(chunk).unwrap();
			cursor.final_write(&mut out, &(chunk.len() as u64).to_be_bytes());
		}
		out.take_output()
	}));
}

criterion_group!(benches, write_slice, write_numbers, drain_to_void, reserve_and_backfill);
criterion_main!(benches);
