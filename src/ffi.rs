//! FFI bindings for the Gizi engine
//!
//! This module provides C-compatible functions for calling the engine from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `gizi_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::adequacy::MicronutrientReference;
use crate::error::EngineError;
use crate::pipeline::{compute_profile_json, evaluate_menu_json, save_menu_json, NutritionPlanner};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string, naming `arg` in the error
unsafe fn cstr_to_string(ptr: *const c_char, arg: &str) -> Result<String, String> {
    if ptr.is_null() {
        return Err(format!("{arg} is null"));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(|s| s.to_string())
        .map_err(|_| format!("{arg} is not valid UTF-8"))
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Hand a pipeline result across the boundary, recording the error on failure
fn into_c_result(result: Result<String, EngineError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a nutrition profile from a patient record JSON.
///
/// # Safety
/// - `record_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `gizi_free_string`.
/// - Returns NULL on error; call `gizi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gizi_compute_profile(record_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let record = match cstr_to_string(record_json, "record_json") {
        Ok(s) => s,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    into_c_result(compute_profile_json(record))
}

/// Evaluate a meal plan against daily targets.
///
/// The food table is parsed on every call; use `gizi_planner_new` to load it once.
///
/// # Safety
/// - `food_table_json` and `request_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `gizi_free_string`.
/// - Returns NULL on error; call `gizi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gizi_evaluate_menu(
    food_table_json: *const c_char,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (table, request) = match menu_arguments(food_table_json, request_json) {
        Some(args) => args,
        None => return ptr::null_mut(),
    };

    into_c_result(evaluate_menu_json(table, request))
}

/// Evaluate a meal plan and return it as a saved menu snapshot.
///
/// # Safety
/// - `food_table_json` and `request_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `gizi_free_string`.
/// - Returns NULL on error (including an empty plan); call `gizi_last_error`
///   to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gizi_save_menu(
    food_table_json: *const c_char,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (table, request) = match menu_arguments(food_table_json, request_json) {
        Some(args) => args,
        None => return ptr::null_mut(),
    };

    into_c_result(save_menu_json(table, request))
}

unsafe fn menu_arguments(
    food_table_json: *const c_char,
    request_json: *const c_char,
) -> Option<(String, String)> {
    let table = match cstr_to_string(food_table_json, "food_table_json") {
        Ok(s) => s,
        Err(msg) => {
            set_last_error(&msg);
            return None;
        }
    };
    let request = match cstr_to_string(request_json, "request_json") {
        Ok(s) => s,
        Err(msg) => {
            set_last_error(&msg);
            return None;
        }
    };
    Some((table, request))
}

// ============================================================================
// Stateful Planner API
// ============================================================================

/// Opaque handle to a NutritionPlanner
pub struct GiziPlannerHandle {
    planner: NutritionPlanner,
}

/// Create a planner holding a parsed food table.
///
/// # Safety
/// - `food_table_json` must be a valid null-terminated C string.
/// - Returns a pointer to a newly allocated planner.
/// - Must be freed with `gizi_planner_free`.
/// - Returns NULL on error; call `gizi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gizi_planner_new(food_table_json: *const c_char) -> *mut GiziPlannerHandle {
    clear_last_error();

    let table = match cstr_to_string(food_table_json, "food_table_json") {
        Ok(s) => s,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    match NutritionPlanner::from_json(&table) {
        Ok(planner) => Box::into_raw(Box::new(GiziPlannerHandle { planner })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a planner.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `gizi_planner_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gizi_planner_free(planner: *mut GiziPlannerHandle) {
    if !planner.is_null() {
        drop(Box::from_raw(planner));
    }
}

/// Replace the planner's micronutrient references from JSON.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `gizi_planner_new`.
/// - `micronutrients_json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `gizi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gizi_planner_set_micronutrients(
    planner: *mut GiziPlannerHandle,
    micronutrients_json: *const c_char,
) -> i32 {
    clear_last_error();

    if planner.is_null() {
        set_last_error("planner is null");
        return -1;
    }

    let handle = &mut *planner;

    let json = match cstr_to_string(micronutrients_json, "micronutrients_json") {
        Ok(s) => s,
        Err(msg) => {
            set_last_error(&msg);
            return -1;
        }
    };

    match MicronutrientReference::from_json(&json) {
        Ok(micros) => {
            handle.planner.set_micronutrients(micros);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Evaluate a meal plan request with a planner's food table.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `gizi_planner_new`.
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `gizi_free_string`.
/// - Returns NULL on error; call `gizi_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gizi_planner_evaluate_menu(
    planner: *const GiziPlannerHandle,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (handle, request) = match planner_arguments(planner, request_json) {
        Some(args) => args,
        None => return ptr::null_mut(),
    };

    into_c_result(handle.planner.evaluate_request_json(&request))
}

/// Evaluate a meal plan request and return it as a saved menu snapshot.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `gizi_planner_new`.
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `gizi_free_string`.
/// - Returns NULL on error (including an empty plan); call `gizi_last_error`
///   to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gizi_planner_save_menu(
    planner: *const GiziPlannerHandle,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (handle, request) = match planner_arguments(planner, request_json) {
        Some(args) => args,
        None => return ptr::null_mut(),
    };

    into_c_result(handle.planner.save_request_json(&request))
}

unsafe fn planner_arguments<'a>(
    planner: *const GiziPlannerHandle,
    request_json: *const c_char,
) -> Option<(&'a GiziPlannerHandle, String)> {
    if planner.is_null() {
        set_last_error("planner is null");
        return None;
    }
    let request = match cstr_to_string(request_json, "request_json") {
        Ok(s) => s,
        Err(msg) => {
            set_last_error(&msg);
            return None;
        }
    };
    Some((&*planner, request))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Gizi functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Gizi function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gizi_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Gizi function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn gizi_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn gizi_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
