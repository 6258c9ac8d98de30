//! Stress tests for Datakeeper.
//!
//! These helpers run vault operations under heavy load and concurrent
//! access. Usecases hold no locks of their own, so the only expectation is
//! that every operation succeeds and every owner reads back a consistent
//! view.

use datakeeper_core::{
    CallContext, CredentialPatch, CredentialSecret, KeyRegistry, UpdateRequest,
    UploadFileRequest, Vault,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform per thread.
    pub operations: usize,
    /// Number of concurrent threads, one owner each.
    pub threads: usize,
    /// Size of uploaded files in bytes.
    pub file_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            file_size: 256,
        }
    }
}

#[derive(Default)]
struct Counters {
    successful: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn record<T, E>(&self, result: Result<T, E>) {
        let counter = if result.is_ok() {
            &self.successful
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self, start: Instant) -> StressTestResult {
        StressTestResult::new(
            self.successful.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            start.elapsed(),
        )
    }
}

fn owner_name(thread: usize) -> String {
    format!("owner-{thread}")
}

fn register_owners(vault: &Vault, threads: usize) {
    for t in 0..threads {
        let key = vault.keys().generate_key();
        vault.keys().set_key(owner_name(t), key);
    }
}

/// Creates credentials from one thread per owner.
///
/// Registers `owner-0` .. `owner-{threads-1}` with generated keys first.
pub fn stress_concurrent_creates(vault: &Vault, config: &StressConfig) -> StressTestResult {
    register_owners(vault, config.threads);
    let counters = Arc::new(Counters::default());
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let vault = vault.clone();
            let counters = Arc::clone(&counters);
            let operations = config.operations;

            thread::spawn(move || {
                let ctx = CallContext::for_owner(owner_name(t));
                for i in 0..operations {
                    let secret = CredentialSecret {
                        name: format!("site-{i}"),
                        login: owner_name(t),
                        password: format!("pw-{t}-{i}"),
                    };
                    counters.record(vault.credentials().create(&ctx, secret));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    counters.finish(start)
}

/// Updates one credential from every thread at once.
///
/// Each thread writes its own password; the stored value must end up
/// equal to one of them.
pub fn stress_concurrent_updates(
    vault: &Vault,
    ctx: &CallContext,
    config: &StressConfig,
) -> StressTestResult {
    let id = vault
        .credentials()
        .create(
            ctx,
            CredentialSecret {
                name: "shared".into(),
                login: "shared".into(),
                password: String::new(),
            },
        )
        .expect("Failed to create shared credential");

    let counters = Arc::new(Counters::default());
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let vault = vault.clone();
            let ctx = ctx.clone();
            let counters = Arc::clone(&counters);
            let operations = config.operations;

            thread::spawn(move || {
                for i in 0..operations {
                    let patch = CredentialPatch {
                        password: Some(format!("pw-{t}-{i}")),
                        ..CredentialPatch::default()
                    };
                    counters.record(vault.credentials().update(&ctx, UpdateRequest::new(id, patch)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    counters.finish(start)
}

/// Uploads, downloads and deletes files from one thread per owner.
pub fn stress_file_cycle(vault: &Vault, config: &StressConfig) -> StressTestResult {
    register_owners(vault, config.threads);
    let counters = Arc::new(Counters::default());
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let vault = vault.clone();
            let counters = Arc::clone(&counters);
            let operations = config.operations;
            let bytes = vec![t as u8; config.file_size];

            thread::spawn(move || {
                let ctx = CallContext::for_owner(owner_name(t));
                let files = vault.files();
                for i in 0..operations {
                    let request = UploadFileRequest {
                        name: format!("file-{i}.bin"),
                        format: "bin".into(),
                        bytes: bytes.clone(),
                    };
                    let id = match files.upload(&ctx, request) {
                        Ok(id) => id,
                        Err(err) => {
                            counters.record::<(), _>(Err(err));
                            continue;
                        }
                    };
                    counters.record(
                        files
                            .download(&ctx, id)
                            .map_err(|e| e.to_string())
                            .and_then(|file| {
                                if file.bytes == bytes {
                                    Ok(())
                                } else {
                                    Err("downloaded bytes differ".to_string())
                                }
                            }),
                    );
                    counters.record(files.delete(&ctx, id));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    counters.finish(start)
}

/// Sets, reads and replaces keys from several threads at once.
pub fn stress_key_registry(registry: &Arc<KeyRegistry>, config: &StressConfig) -> StressTestResult {
    let counters = Arc::new(Counters::default());
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let registry = Arc::clone(registry);
            let counters = Arc::clone(&counters);
            let operations = config.operations;

            thread::spawn(move || {
                for i in 0..operations {
                    let owner = owner_name((t + i) % 8);
                    if i % 4 == 0 {
                        registry.set_key(owner, registry.generate_key());
                        counters.record::<(), ()>(Ok(()));
                    } else {
                        // Absent keys are a normal outcome here.
                        let _ = registry.get_key(&owner);
                        counters.record::<(), ()>(Ok(()));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    counters.finish(start)
}
