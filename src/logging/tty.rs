//! Terminal detection for the stderr log

#[cfg(unix)]
use std::os::unix::io::RawFd;

/// File descriptor the eager log writes to
const STDERR_FD: i32 = 2;

/// Check if a file descriptor is a TTY
#[cfg(unix)]
#[inline(always)]
fn is_atty(fd: i32) -> bool {
    unsafe { libc::isatty(fd as RawFd) != 0 }
}

#[cfg(windows)]
#[inline(always)]
fn is_atty(fd: i32) -> bool {
    use std::os::windows::io::RawHandle;
    use windows_sys::Win32::System::Console::{
        GetConsoleMode, GetStdHandle, STD_ERROR_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
    };

    let handle: RawHandle = match fd {
        0 => unsafe { GetStdHandle(STD_INPUT_HANDLE) as RawHandle },
        1 => unsafe { GetStdHandle(STD_OUTPUT_HANDLE) as RawHandle },
        2 => unsafe { GetStdHandle(STD_ERROR_HANDLE) as RawHandle },
        _ => return false,
    };

    if handle.is_null() || handle == -1isize as RawHandle {
        return false;
    }

    let mut mode: u32 = 0;
    unsafe { GetConsoleMode(handle as _, &mut mode) != 0 }
}

#[cfg(not(any(unix, windows)))]
fn is_atty(_fd: i32) -> bool {
    false
}

/// Whether the eager log is writing to an interactive terminal
pub fn stderr_is_terminal() -> bool {
    is_atty(STDERR_FD)
}
