#[cfg(test)]
mod fs_tests {
    use super::super::*;
    use crate::kernel::syscalls::fs_constants::*;
    use crate::kernel::{ProgramRegistry, UserContext};

    #[test]
    pub fn file_limit_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        for fd in STARTINGFD..MAXFD {
            assert_eq!(process.creat_syscall(&fd.to_string()), fd);
        }
        // every slot is taken, including the standard streams
        assert_eq!(process.creat_syscall("16"), -1);
        assert!(!kernel.filesystem().exists("16"));
        assert_eq!(process.open_syscall("2"), -1);

        kernel.finalize();
    }

    #[test]
    pub fn open_nofile_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        assert_eq!(process.open_syscall("file_not_exist"), -1);
        // a failed open binds nothing
        assert_eq!(process.filedescriptortable.open_fds(), vec![0, 1]);

        kernel.finalize();
    }

    #[test]
    pub fn lowest_fd_reuse_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        assert_eq!(process.creat_syscall("a"), 2);
        assert_eq!(process.creat_syscall("b"), 3);
        assert_eq!(process.creat_syscall("c"), 4);
        assert_eq!(process.close_syscall(3), 0);
        assert_eq!(process.open_syscall("a"), 3);
        assert_eq!(process.creat_syscall("d"), 5);

        kernel.finalize();
    }

    #[test]
    pub fn close_invalid_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        assert_eq!(process.close_syscall(-1), -1);
        assert_eq!(process.close_syscall(MAXFD), -1);
        assert_eq!(process.close_syscall(7), -1);

        let fd = process.creat_syscall("once");
        assert_eq!(process.close_syscall(fd), 0);
        assert_eq!(process.close_syscall(fd), -1);

        kernel.finalize();
    }

    #[test]
    pub fn std_streams_closable_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        assert_eq!(process.close_syscall(STDIN_FILENO), 0);
        assert_eq!(process.close_syscall(STDOUT_FILENO), 0);
        // freed standard slots are never handed out again
        assert_eq!(process.creat_syscall("x"), STARTINGFD);
        assert_eq!(process.write_syscall(STDOUT_FILENO, b"lost"), -1);

        kernel.finalize();
    }

    #[test]
    pub fn open_shares_entry_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let fd1 = process.creat_syscall("shared");
        let fd2 = process.open_syscall("shared");
        assert_eq!((fd1, fd2), (2, 3));
        assert_eq!(kernel.filesystem().open_count("shared"), Some(2));

        assert_eq!(process.write_syscall(fd1, b"hello there!"), 12);
        let mut readbuf = sizecbuf(5);
        assert_eq!(process.read_syscall(fd2, &mut readbuf), 5);
        assert_eq!(cbuf2str(&readbuf), "hello");

        assert_eq!(process.close_syscall(fd1), 0);
        assert_eq!(kernel.filesystem().open_count("shared"), Some(1));
        assert_eq!(process.close_syscall(fd2), 0);
        // closing does not delete a live name
        assert_eq!(kernel.filesystem().open_count("shared"), Some(0));
        assert_eq!(process.open_syscall("shared"), 2);

        kernel.finalize();
    }

    #[test]
    pub fn unlink_while_open_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let writer = process.creat_syscall("doomed");
        let reader = process.open_syscall("doomed");
        assert_eq!(process.write_syscall(writer, b"still here"), 10);

        assert_eq!(process.unlink_syscall("doomed"), 0);
        assert!(!kernel.filesystem().exists("doomed"));
        assert_eq!(process.open_syscall("doomed"), -1);
        assert_eq!(process.unlink_syscall("doomed"), -1);

        // existing descriptors keep working until the last close
        let mut readbuf = sizecbuf(10);
        assert_eq!(process.read_syscall(reader, &mut readbuf), 10);
        assert_eq!(cbuf2str(&readbuf), "still here");
        assert_eq!(kernel.filesystem().inode_count(), 1);

        assert_eq!(process.close_syscall(writer), 0);
        assert_eq!(kernel.filesystem().inode_count(), 1);
        assert_eq!(process.close_syscall(reader), 0);
        assert_eq!(kernel.filesystem().inode_count(), 0);

        kernel.finalize();
    }

    #[test]
    pub fn unlink_closed_file_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let fd = process.creat_syscall("tmp");
        assert_eq!(process.close_syscall(fd), 0);
        assert_eq!(process.unlink_syscall("tmp"), 0);
        assert_eq!(kernel.filesystem().inode_count(), 0);
        assert_eq!(process.open_syscall("tmp"), -1);

        assert_eq!(process.unlink_syscall("never_existed"), -1);
        assert_eq!(process.unlink_syscall(""), -1);

        kernel.finalize();
    }

    #[test]
    pub fn creat_after_unlink_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let old = process.creat_syscall("name");
        assert_eq!(process.write_syscall(old, b"old contents"), 12);
        assert_eq!(process.unlink_syscall("name"), 0);

        // the name is free again; the new entry is unrelated to the old one
        let new = process.creat_syscall("name");
        assert_eq!(new, 3);
        let mut readbuf = sizecbuf(12);
        assert_eq!(process.read_syscall(new, &mut readbuf), 0);
        assert_eq!(kernel.filesystem().inode_count(), 2);

        assert_eq!(process.close_syscall(old), 0);
        assert_eq!(kernel.filesystem().inode_count(), 1);
        assert!(kernel.filesystem().exists("name"));

        kernel.finalize();
    }

    #[test]
    pub fn creat_truncates_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let fd = process.creat_syscall("log");
        assert_eq!(process.write_syscall(fd, b"hello"), 5);
        let again = process.creat_syscall("log");
        assert_eq!(again, 3);
        assert_eq!(kernel.filesystem().open_count("log"), Some(2));

        let reader = process.open_syscall("log");
        let mut readbuf = sizecbuf(5);
        assert_eq!(process.read_syscall(reader, &mut readbuf), 0);

        kernel.finalize();
    }

    #[test]
    pub fn rdwrtest() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let fd = process.creat_syscall("foobar");
        assert_eq!(process.write_syscall(fd, b"hello there!"), 12);
        // the writer's position is now at the end
        let mut readbuf = sizecbuf(4);
        assert_eq!(process.read_syscall(fd, &mut readbuf), 0);

        let reader = process.open_syscall("foobar");
        let mut readbuf1 = sizecbuf(5);
        assert_eq!(process.read_syscall(reader, &mut readbuf1), 5);
        assert_eq!(cbuf2str(&readbuf1), "hello");

        assert_eq!(process.write_syscall(fd, b" world"), 6);
        let mut readbuf2 = sizecbuf(32);
        assert_eq!(process.read_syscall(reader, &mut readbuf2), 13);
        assert_eq!(cbuf2str(&readbuf2[..13]), " there! world");

        assert_eq!(process.read_syscall(9, &mut readbuf2), -1);
        assert_eq!(process.write_syscall(-3, b"x"), -1);

        kernel.finalize();
    }

    #[test]
    pub fn write_size_limit_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let fd = process.creat_syscall("big");
        let limit = kernel.config().max_write_size;
        let buf = vec![7u8; limit];
        assert_eq!(process.write_syscall(fd, &buf), -1);
        assert_eq!(process.write_syscall(fd, &buf[..limit - 1]), (limit - 1) as i32);

        kernel.finalize();
    }

    #[test]
    pub fn transfer_len_test() {
        use crate::kernel::syscalls::fs_calls::transfer_len;

        assert_eq!(transfer_len(0), 0);
        assert_eq!(transfer_len(4096), 4096);
        assert_eq!(transfer_len(MAX_TRANSFER_SIZE), MAX_TRANSFER_SIZE);
        assert_eq!(transfer_len(usize::MAX), i32::MAX as usize);
    }

    #[test]
    pub fn concurrent_creat_close_test() {
        const THREADS: usize = 20;
        const ROUNDS: usize = 50;

        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = kernel.process(root.pid()).unwrap();
        // descriptors some thread currently holds
        let held = interface::RustMutex::new(std::collections::BTreeSet::new());
        let full = interface::RustAtomicI32::new(0);

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let process = &process;
                let held = &held;
                let full = &full;
                scope.spawn(move || {
                    for round in 0..ROUNDS {
                        let mut mine = Vec::new();
                        // two at a time, so the 14 free slots run out
                        for n in 0..2 {
                            let fd = process.creat_syscall(&format!("t{}_{}_{}", t, round, n));
                            if fd < 0 {
                                full.fetch_add(1, interface::RustAtomicOrdering::SeqCst);
                                continue;
                            }
                            assert!((STARTINGFD..MAXFD).contains(&fd));
                            let mut guard = held.lock();
                            assert!(guard.insert(fd), "fd {} handed out twice", fd);
                            assert!(guard.len() <= (MAXFD - STARTINGFD) as usize);
                            drop(guard);
                            mine.push(fd);
                        }
                        for fd in mine {
                            held.lock().remove(&fd);
                            assert_eq!(process.close_syscall(fd), 0);
                        }
                    }
                });
            }
        });

        assert!(held.lock().is_empty());
        assert_eq!(process.filedescriptortable.open_fds(), vec![0, 1]);
        // a failed creat leaves no entry behind
        let created = kernel.filesystem().inode_count();
        let attempted = THREADS * ROUNDS * 2;
        assert_eq!(
            created + full.load(interface::RustAtomicOrdering::SeqCst) as usize,
            attempted
        );

        kernel.finalize();
    }

    #[test]
    pub fn console_test() {
        let (kernel, console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        assert_eq!(process.write_syscall(STDOUT_FILENO, b"to the console"), 14);
        assert_eq!(console.output_string(), "to the console");
        assert_eq!(root.print("!"), 1);
        assert_eq!(console.take_output(), b"to the console!".to_vec());

        console.push_input(b"abc");
        let mut readbuf = sizecbuf(2);
        assert_eq!(process.read_syscall(STDIN_FILENO, &mut readbuf), 2);
        assert_eq!(cbuf2str(&readbuf), "ab");
        assert_eq!(process.read_syscall(STDIN_FILENO, &mut readbuf), 1);
        assert_eq!(process.read_syscall(STDIN_FILENO, &mut readbuf), 0);

        // the streams only go one way
        assert_eq!(process.read_syscall(STDOUT_FILENO, &mut readbuf), -1);
        assert_eq!(process.write_syscall(STDIN_FILENO, b"x"), -1);

        kernel.finalize();
    }

    #[test]
    pub fn name_length_test() {
        let (kernel, _console) = test_kernel(ProgramRegistry::new());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let longest = "n".repeat(kernel.config().max_string_len);
        let too_long = "n".repeat(kernel.config().max_string_len + 1);
        assert_eq!(process.creat_syscall(&longest), 2);
        assert_eq!(process.creat_syscall(&too_long), -1);
        assert_eq!(process.open_syscall(&too_long), -1);
        assert_eq!(process.unlink_syscall(&too_long), -1);
        assert_eq!(process.creat_syscall(""), -1);

        kernel.finalize();
    }

    #[test]
    pub fn exit_releases_fds_test() {
        let registry = ProgramRegistry::new();
        registry.register("holder", |ctx: &UserContext, _args: &[String]| {
            // opened twice and never closed
            ctx.open("shared");
            ctx.open("shared");
            ctx.creat("private");
            0
        });
        let (kernel, _console) = test_kernel(registry);
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let fd = process.creat_syscall("shared");
        assert_eq!(process.unlink_syscall("private"), -1);

        let child = process.exec_syscall("holder", 0, &[]);
        let mut status = -1;
        assert_eq!(process.join_syscall(child, &mut status), 0);
        assert_eq!(kernel.filesystem().open_count("shared"), Some(1));
        assert_eq!(kernel.filesystem().open_count("private"), Some(0));

        // the deferred delete completes with the last holder gone
        assert_eq!(process.unlink_syscall("shared"), 0);
        assert_eq!(kernel.filesystem().inode_count(), 2);
        assert_eq!(process.close_syscall(fd), 0);
        assert_eq!(kernel.filesystem().inode_count(), 1);

        kernel.finalize();
    }

    #[test]
    pub fn cat_program_test() {
        let (kernel, console) = test_kernel(crate::tools::programs::demo_registry());
        let root = kernel.init_root().unwrap();
        let process = root.process();

        let fd = process.creat_syscall("note");
        assert_eq!(process.write_syscall(fd, b"line one\nline two\n"), 18);
        assert_eq!(process.close_syscall(fd), 0);

        let child = process.exec_syscall("cat", 1, &["note"]);
        let mut status = -1;
        assert_eq!(process.join_syscall(child, &mut status), 0);
        assert_eq!(console.output_string(), "line one\nline two\n");

        let child = process.exec_syscall("cat", 1, &["missing"]);
        assert_eq!(process.join_syscall(child, &mut status), 1);

        kernel.finalize();
    }
}
