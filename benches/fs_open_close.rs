/* Benchmarks for the descriptor layer.  In general, I'm not doing results
 * checking / assertions beyond sanity checks to avoid adding bias to the
 * results.  */

use criterion::{criterion_group, criterion_main, Criterion};

use minikern::interface;
use minikern::kernel::{Kernel, KernelConfig, ProgramRegistry};

use std::ffi::CString;


pub fn run_benchmark(c: &mut Criterion) {
    // Same setup as the unit tests: one kernel, the root bound to this thread.
    let kernel = Kernel::new(
        KernelConfig::default(),
        interface::RustRfc::new(ProgramRegistry::new()),
        interface::RustRfc::new(interface::BufferConsole::new()),
    );
    let root = kernel.init_root().unwrap();
    let process = root.process();

    // --- COMPARING creat / open / close CALLS ACROSS minikern + Native OS kernel ---
    let mut group = c.benchmark_group("Compare fs:open+close");

    // Should be similar.  Use a linear scale...
    group.plot_config(
        criterion::PlotConfiguration::default().summary_scale(criterion::AxisScale::Linear),
    );

    group.bench_function("TF01: minikern creat+close", |b| {
        b.iter(|| {
            let fd = process.creat_syscall("foo");
            assert!(fd >= 2); // Ensure we didn't get an error or an odd fd
            assert_eq!(process.close_syscall(fd), 0);
        })
    });

    group.bench_function("TF01: minikern open+close", |b| {
        b.iter(|| {
            let fd = process.open_syscall("foo");
            assert!(fd >= 2);
            assert_eq!(process.close_syscall(fd), 0);
        })
    });

    // For comparison let's time the native OS...
    let path = CString::new("/tmp/minikern-bench-foo").unwrap();
    group.bench_function("TF01: Native OS kernel open+close", |b| {
        b.iter(|| unsafe {
            let fd = libc::open(
                path.as_ptr(),
                libc::O_CREAT | libc::O_TRUNC | libc::O_WRONLY,
                0o700,
            );
            assert!(fd > 2);
            assert_eq!(libc::close(fd), 0);
        })
    });

    // Every descriptor table slot in turn, then release them all.
    group.bench_function("TF02: minikern fill+drain fd table", |b| {
        b.iter(|| {
            let fds: Vec<i32> = (0..14).map(|_| process.open_syscall("foo")).collect();
            for fd in fds {
                assert_eq!(process.close_syscall(fd), 0);
            }
        })
    });

    group.finish();

    unsafe {
        libc::unlink(path.as_ptr());
    }
    kernel.finalize();
}

criterion_group!(name=benches;
                 // Add the global settings here so we don't type it everywhere
                 config=global_criterion_settings::get_criterion();
                 targets=run_benchmark);
criterion_main!(benches);
