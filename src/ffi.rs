//! C FFI bindings for u-report.
//!
//! Reports cross the boundary as JSON strings owned by Rust.
//!
//! # Design
//!
//! - **Opaque handle**: `*mut ReportContext` holds a loaded table
//! - **Owned strings**: every `*mut c_char` returned must be released with
//!   `report_string_free`
//! - **Null on failure**: the reason is available from `report_last_error()`
//!   on the same thread
//! - **`catch_unwind`**: entry points never let a panic cross the boundary
//!
//! # Safety
//!
//! Null pointer arguments are rejected with an error, never dereferenced.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic;
use std::ptr;

use crate::ingest::CsvLoader;
use crate::report::{generate_report, ReportType};
use crate::table::Table;

// ── Error handling ────────────────────────────────────────────────────

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

/// Returns the last error message, or null if no error.
/// The returned string is valid until the next FFI call on this thread.
///
/// # Safety
/// The caller must not free the returned pointer.
#[no_mangle]
pub extern "C" fn report_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        let borrow = cell.borrow();
        match borrow.as_ref() {
            Some(cstr) => cstr.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Clears the last error message.
#[no_mangle]
pub extern "C" fn report_clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Borrows a C string as UTF-8, recording an error on failure.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string.
unsafe fn borrow_str<'a>(ptr: *const c_char, what: &str) -> Option<&'a str> {
    if ptr.is_null() {
        set_last_error(&format!("null {what} pointer"));
        return None;
    }
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Some(s),
        Err(e) => {
            set_last_error(&format!("invalid UTF-8 in {what}: {e}"));
            None
        }
    }
}

/// Report type from an optional C string; null or unknown means summary.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string.
unsafe fn parse_report_type(ptr: *const c_char) -> ReportType {
    if ptr.is_null() {
        return ReportType::Summary;
    }
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => ReportType::parse_lenient(s),
        Err(_) => ReportType::Summary,
    }
}

fn report_json(table: &Table, report_type: ReportType) -> *mut c_char {
    let json = match generate_report(table, report_type).to_json() {
        Ok(json) => json,
        Err(e) => {
            set_last_error(&format!("serialization failed: {e}"));
            return ptr::null_mut();
        }
    };
    match CString::new(json) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            set_last_error(&format!("report contains a NUL byte: {e}"));
            ptr::null_mut()
        }
    }
}

// ── One-shot generation ──────────────────────────────────────────────

/// Parses CSV text and returns the report as a JSON string.
///
/// `report_type` is `"summary"`, `"detailed"` or `"overview"`; null or an
/// unknown value produces a summary report. Returns null on failure.
///
/// # Safety
/// - `csv_data` must be a valid null-terminated UTF-8 string.
/// - `report_type` must be null or a valid null-terminated string.
/// - The returned string must be freed with `report_string_free`.
#[no_mangle]
pub unsafe extern "C" fn report_generate_csv(
    csv_data: *const c_char,
    report_type: *const c_char,
) -> *mut c_char {
    let result = panic::catch_unwind(|| {
        let Some(csv) = (unsafe { borrow_str(csv_data, "csv_data") }) else {
            return ptr::null_mut();
        };
        let report_type = unsafe { parse_report_type(report_type) };
        let table = match CsvLoader::new().load_str(csv) {
            Ok(t) => t,
            Err(e) => {
                set_last_error(&format!("CSV load error: {e}"));
                return ptr::null_mut();
            }
        };
        report_json(&table, report_type)
    });

    match result {
        Ok(ptr) => ptr,
        Err(_) => {
            set_last_error("panic in report_generate_csv");
            ptr::null_mut()
        }
    }
}

/// Frees a string returned by this library.
///
/// # Safety
/// `s` must be a pointer returned by a `report_*` function, or null.
#[no_mangle]
pub unsafe extern "C" fn report_string_free(s: *mut c_char) {
    if !s.is_null() {
        let _ = unsafe { CString::from_raw(s) };
    }
}

// ── Report Context (opaque handle) ───────────────────────────────────

/// Opaque handle holding a loaded table, for generating several reports
/// from one parse.
pub struct ReportContext {
    table: Table,
}

/// Loads CSV text into a context.
///
/// # Safety
/// - `csv_data` must be a valid null-terminated UTF-8 string.
/// - The returned handle must be freed with `report_context_free`.
#[no_mangle]
pub unsafe extern "C" fn report_load_csv(csv_data: *const c_char) -> *mut ReportContext {
    let result = panic::catch_unwind(|| {
        let Some(csv) = (unsafe { borrow_str(csv_data, "csv_data") }) else {
            return ptr::null_mut();
        };
        match CsvLoader::new().load_str(csv) {
            Ok(table) => Box::into_raw(Box::new(ReportContext { table })),
            Err(e) => {
                set_last_error(&format!("CSV load error: {e}"));
                ptr::null_mut()
            }
        }
    });

    match result {
        Ok(ptr) => ptr,
        Err(_) => {
            set_last_error("panic in report_load_csv");
            ptr::null_mut()
        }
    }
}

/// Frees a report context.
///
/// # Safety
/// `ctx` must be a valid pointer from `report_load_csv`, or null.
#[no_mangle]
pub unsafe extern "C" fn report_context_free(ctx: *mut ReportContext) {
    if !ctx.is_null() {
        let _ = unsafe { Box::from_raw(ctx) };
    }
}

/// Returns the number of rows after cleaning, or -1 for a null context.
///
/// # Safety
/// `ctx` must be a valid context or null.
#[no_mangle]
pub unsafe extern "C" fn report_row_count(ctx: *const ReportContext) -> i64 {
    if ctx.is_null() {
        set_last_error("null context");
        return -1;
    }
    let ctx = unsafe { &*ctx };
    ctx.table.row_count() as i64
}

/// Returns the number of columns after cleaning, or -1 for a null context.
///
/// # Safety
/// `ctx` must be a valid context or null.
#[no_mangle]
pub unsafe extern "C" fn report_column_count(ctx: *const ReportContext) -> i64 {
    if ctx.is_null() {
        set_last_error("null context");
        return -1;
    }
    let ctx = unsafe { &*ctx };
    ctx.table.column_count() as i64
}

/// Generates a report from a loaded context as a JSON string.
///
/// # Safety
/// - `ctx` must be a valid context.
/// - `report_type` must be null or a valid null-terminated string.
/// - The returned string must be freed with `report_string_free`.
#[no_mangle]
pub unsafe extern "C" fn report_generate(
    ctx: *const ReportContext,
    report_type: *const c_char,
) -> *mut c_char {
    if ctx.is_null() {
        set_last_error("null context");
        return ptr::null_mut();
    }
    let result = panic::catch_unwind(|| {
        let ctx = unsafe { &*ctx };
        let report_type = unsafe { parse_report_type(report_type) };
        report_json(&ctx.table, report_type)
    });

    match result {
        Ok(ptr) => ptr,
        Err(_) => {
            set_last_error("panic in report_generate");
            ptr::null_mut()
        }
    }
}

// ── Version ──────────────────────────────────────────────────────────

/// Returns the version string of u-report.
///
/// # Safety
/// The returned string is a static string literal. Do not free it.
#[no_mangle]
pub extern "C" fn report_version() -> *const c_char {
    c"0.1.0".as_ptr()
}

// ── Tests ─────────────────────────────────────────────────────────────
