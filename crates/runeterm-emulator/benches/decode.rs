use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use runeterm_core::Dimensions;
use runeterm_emulator::{Decoder, Grid};

/// Typical interactive shell output: prompts, colors, cursor motion.
fn shell_like_stream(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        out.extend_from_slice(b"\x1b[32muser@host\x1b[0m:\x1b[34m~/src\x1b[0m$ ls -la\r\n");
        out.extend_from_slice(b"drwxr-xr-x  4 user user  4096 Jan 12 09:30 \x1b[1;34mtarget\x1b[0m\r\n");
        out.extend_from_slice("-rw-r--r--  1 user user   712 Jan 12 09:28 r\u{00e9}sum\u{00e9}.txt\r\n".as_bytes());
        out.extend_from_slice(b"\x1b[2J\x1b[1;1H");
    }
    out.truncate(len);
    out
}

/// Pure printable ASCII, the fast path.
fn ascii_stream(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [4 * 1024usize, 64 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));

        let ascii = ascii_stream(size);
        group.bench_with_input(BenchmarkId::new("ascii", size), &ascii, |b, data| {
            b.iter(|| {
                let mut grid = Grid::new(Dimensions::new(50, 160));
                let mut decoder = Decoder::new();
                decoder.process(&mut grid, black_box(data));
            });
        });

        let mixed = shell_like_stream(size);
        group.bench_with_input(BenchmarkId::new("shell_output", size), &mixed, |b, data| {
            b.iter(|| {
                let mut grid = Grid::new(Dimensions::new(50, 160));
                let mut decoder = Decoder::new();
                decoder.process(&mut grid, black_box(data));
            });
        });
    }

    group.finish();
}

fn bench_decode_chunked(c: &mut Criterion) {
    let data = shell_like_stream(64 * 1024);

    let mut group = c.benchmark_group("decode_chunked");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk in [64usize, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let mut grid = Grid::new(Dimensions::new(50, 160));
                let mut decoder = Decoder::new();
                for piece in data.chunks(chunk) {
                    decoder.process(&mut grid, black_box(piece));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_decode_chunked);
criterion_main!(benches);
