// Built-in programs for booting a kernel without any user binaries.
//
// exception_test drives the join/halt/file-limit scenarios; child_1,
// child_2, child_3 and halt are the programs it starts. Assertion failures
// are printed to the console and counted into the exit status.

use crate::kernel::syscalls::fs_constants::*;
use crate::kernel::syscalls::sys_constants::*;
use crate::kernel::{ProgramRegistry, UserContext};

fn assert_eq_line(ctx: &UserContext, program: &str, line: u32, actual: i32, expected: i32) -> i32 {
    if actual != expected {
        ctx.print(&format!(
            "assert fail in line {} in {} {}!={}\n",
            line, program, actual, expected
        ));
        return 1;
    }
    0
}

macro_rules! check_eq {
    ($failures:ident, $ctx:expr, $program:expr, $actual:expr, $expected:expr) => {
        $failures += assert_eq_line($ctx, $program, line!(), $actual, $expected)
    };
}

fn halt_from_invalid(ctx: &UserContext) -> i32 {
    let mut failures = 0;
    let child = ctx.exec("halt", &[]);
    let mut status = 0;

    // a halt from anything but the root only ends that process
    let exit_status = ctx.join(child, &mut status);
    check_eq!(failures, ctx, "exception_test", exit_status, JOIN_HALTED_RETURN);

    let exit_status = ctx.join(child + 10, &mut status);
    check_eq!(failures, ctx, "exception_test", exit_status, -1);
    failures
}

fn join_test(ctx: &UserContext) -> i32 {
    let mut failures = 0;
    let child = ctx.exec("child_1", &[]);
    let mut status = 0;

    // child_1 exits with the id of child_3
    ctx.join(child, &mut status);
    let mut new_status = 0;
    let exit_status = ctx.join(status, &mut new_status);
    check_eq!(failures, ctx, "exception_test", exit_status, -1);

    let exit_status = ctx.join(child, &mut new_status);
    check_eq!(failures, ctx, "exception_test", exit_status, -1);
    failures
}

fn file_limit_test(ctx: &UserContext) -> i32 {
    let mut failures = 0;
    for fd in STARTINGFD..MAXFD {
        check_eq!(failures, ctx, "exception_test", ctx.creat(&fd.to_string()), fd);
    }
    check_eq!(failures, ctx, "exception_test", ctx.creat(&MAXFD.to_string()), -1);
    failures
}

fn open_nofile_test(ctx: &UserContext) -> i32 {
    let mut failures = 0;
    check_eq!(failures, ctx, "exception_test", ctx.open("file_not_exist"), -1);
    failures
}

pub fn exception_test(ctx: &UserContext, _args: &[String]) -> i32 {
    let failures = halt_from_invalid(ctx)
        + join_test(ctx)
        + file_limit_test(ctx)
        + open_nofile_test(ctx);
    if failures == 0 {
        ctx.print("exception_test passed\n");
    }
    failures
}

pub fn child_1(ctx: &UserContext, _args: &[String]) -> i32 {
    let mut failures = 0;
    let child = ctx.exec("child_2", &[]);
    let mut status = 0;
    ctx.join(child, &mut status);
    check_eq!(failures, ctx, "child_1", status, 1);

    for i in 0..10 {
        ctx.print(&format!("from child_1, {}\n", i));
    }
    if failures > 0 {
        return -failures;
    }
    let grandchild = ctx.exec("child_3", &[]);
    ctx.exit(grandchild)
}

pub fn child_2(ctx: &UserContext, _args: &[String]) -> i32 {
    for i in 0..10 {
        ctx.print(&format!("from child_2, {}\n", i));
    }
    EXIT_FAILURE
}

pub fn child_3(ctx: &UserContext, _args: &[String]) -> i32 {
    for i in 0..10 {
        ctx.print(&format!("from child_3, {}\n", i));
    }
    EXIT_SUCCESS
}

pub fn halt(ctx: &UserContext, _args: &[String]) -> i32 {
    ctx.halt()
}

/// Echo the arguments to standard output, one per line.
pub fn echo(ctx: &UserContext, args: &[String]) -> i32 {
    for arg in args {
        ctx.print(arg);
        ctx.print("\n");
    }
    EXIT_SUCCESS
}

/// Copy a file to standard output. Exits with 1 if it cannot be opened.
pub fn cat(ctx: &UserContext, args: &[String]) -> i32 {
    let name = match args.first() {
        Some(name) => name,
        None => return EXIT_FAILURE,
    };
    let fd = ctx.open(name);
    if fd < 0 {
        return EXIT_FAILURE;
    }
    let mut buf = [0u8; 128];
    loop {
        let count = ctx.read(fd, &mut buf);
        if count <= 0 {
            break;
        }
        ctx.write(STDOUT_FILENO, &buf[..count as usize]);
    }
    ctx.close(fd);
    EXIT_SUCCESS
}

pub fn demo_registry() -> ProgramRegistry {
    let registry = ProgramRegistry::new();
    registry.register("exception_test", exception_test);
    registry.register("child_1", child_1);
    registry.register("child_2", child_2);
    registry.register("child_3", child_3);
    registry.register("halt", halt);
    registry.register("echo", echo);
    registry.register("cat", cat);
    registry
}
