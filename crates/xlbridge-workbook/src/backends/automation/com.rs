//! `IDispatch` calls through the `windows` crate.

use std::ptr;
use std::rc::Rc;

use tracing::debug;
use windows::Win32::Foundation::DISP_E_PARAMNOTFOUND;
use windows::Win32::System::Com::{
    CLSCTX_LOCAL_SERVER, CLSIDFromProgID, CoCreateInstance, DISPATCH_FLAGS, DISPATCH_METHOD,
    DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT, DISPPARAMS, EXCEPINFO, IDispatch,
};
use windows::Win32::System::Ole::{DISPID_PROPERTYPUT, GetActiveObject};
use windows::Win32::System::Variant::{
    VARENUM, VT_BOOL, VT_BSTR, VT_CY, VT_DATE, VT_DECIMAL, VT_DISPATCH, VT_EMPTY, VT_ERROR, VT_I1,
    VT_I2, VT_I4, VT_I8, VT_INT, VT_NULL, VT_R4, VT_R8, VT_UI1, VT_UI2, VT_UI4, VT_UI8, VT_UINT,
    VT_UNKNOWN, VAR_CHANGE_FLAGS, VariantChangeType,
};
use windows::core::{BSTR, GUID, IUnknown, Interface, PCWSTR, VARIANT, w};

use crate::error::{BridgeError, Result};

use super::BACKEND;
use super::dispatch::{Dispatch, Variant};

const LOCALE_USER_DEFAULT: u32 = 0x0400;

fn com_error(context: &str, err: windows::core::Error) -> BridgeError {
    BridgeError::from_backend(BACKEND, format!("{context}: {err}"))
}

/// An `IDispatch` pointer owned by this thread's apartment.
pub(crate) struct ComObject {
    inner: IDispatch,
}

impl ComObject {
    fn new(inner: IDispatch) -> Self {
        Self { inner }
    }

    fn dispid(&self, name: &str) -> Result<i32> {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let names = [PCWSTR(wide.as_ptr())];
        let mut id = 0i32;
        unsafe {
            self.inner.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                LOCALE_USER_DEFAULT,
                &mut id,
            )
        }
        .map_err(|e| com_error(name, e))?;
        Ok(id)
    }

    fn invoke(
        &self,
        name: &str,
        flags: DISPATCH_FLAGS,
        args: &[Variant],
        value: Option<&Variant>,
    ) -> Result<Variant> {
        let dispid = self.dispid(name)?;

        // Arguments travel in reverse order; a put value goes first and is
        // named DISPID_PROPERTYPUT.
        let mut raw = Vec::with_capacity(args.len() + 1);
        if let Some(v) = value {
            raw.push(to_variant(v)?);
        }
        for arg in args.iter().rev() {
            raw.push(to_variant(arg)?);
        }
        let mut named = [DISPID_PROPERTYPUT];
        let params = DISPPARAMS {
            rgvarg: if raw.is_empty() {
                ptr::null_mut()
            } else {
                raw.as_mut_ptr()
            },
            rgdispidNamedArgs: if value.is_some() {
                named.as_mut_ptr()
            } else {
                ptr::null_mut()
            },
            cArgs: raw.len() as u32,
            cNamedArgs: u32::from(value.is_some()),
        };

        let mut result = VARIANT::default();
        let mut exception = EXCEPINFO::default();
        let mut arg_err = 0u32;
        let outcome = unsafe {
            self.inner.Invoke(
                dispid,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                Some(&raw mut result),
                Some(&raw mut exception),
                Some(&raw mut arg_err),
            )
        };
        if let Err(err) = outcome {
            let description = exception.bstrDescription.to_string();
            if description.is_empty() {
                return Err(com_error(name, err));
            }
            return Err(BridgeError::from_backend(
                BACKEND,
                format!("{name}: {description}"),
            ));
        }
        from_variant(&result)
    }
}

impl Dispatch for ComObject {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        self.invoke(name, DISPATCH_PROPERTYGET, args, None)
    }

    fn put(&self, name: &str, args: &[Variant], value: Variant) -> Result<()> {
        self.invoke(name, DISPATCH_PROPERTYPUT, args, Some(&value))
            .map(|_| ())
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        self.invoke(name, DISPATCH_METHOD, args, None)
    }

    fn interface(&self) -> Option<IDispatch> {
        Some(self.inner.clone())
    }
}

fn to_variant(value: &Variant) -> Result<VARIANT> {
    Ok(match value {
        Variant::Empty => VARIANT::default(),
        Variant::Missing => {
            let code = VARIANT::from(DISP_E_PARAMNOTFOUND.0);
            let mut missing = VARIANT::default();
            unsafe { VariantChangeType(&mut missing, &code, VAR_CHANGE_FLAGS(0), VT_ERROR) }
                .map_err(|e| com_error("VariantChangeType", e))?;
            missing
        }
        Variant::Bool(b) => VARIANT::from(*b),
        Variant::Int(n) => match i32::try_from(*n) {
            Ok(n) => VARIANT::from(n),
            Err(_) => VARIANT::from(*n as f64),
        },
        Variant::Float(n) => VARIANT::from(*n),
        Variant::Text(s) => VARIANT::from(BSTR::from(s.as_str())),
        Variant::Error(code) => VARIANT::from(*code),
        Variant::Object(obj) => {
            let dispatch = obj.interface().ok_or_else(|| {
                BridgeError::from_backend(BACKEND, "object argument has no COM interface")
            })?;
            let unknown: IUnknown = dispatch
                .cast()
                .map_err(|e| com_error("QueryInterface", e))?;
            VARIANT::from(unknown)
        }
    })
}

fn from_variant(value: &VARIANT) -> Result<Variant> {
    let conversion = |e| com_error("variant conversion", e);
    let vt: VARENUM = value.vt();
    Ok(match vt {
        VT_EMPTY | VT_NULL => Variant::Empty,
        VT_BOOL => Variant::Bool(bool::try_from(value).map_err(conversion)?),
        VT_I1 | VT_I2 | VT_I4 | VT_I8 | VT_INT | VT_UI1 | VT_UI2 | VT_UI4 | VT_UINT => {
            Variant::Int(i64::try_from(value).map_err(conversion)?)
        }
        VT_R4 | VT_R8 | VT_CY | VT_DATE | VT_DECIMAL | VT_UI8 => {
            Variant::Float(f64::try_from(value).map_err(conversion)?)
        }
        VT_BSTR => Variant::Text(BSTR::try_from(value).map_err(conversion)?.to_string()),
        VT_DISPATCH | VT_UNKNOWN => {
            let unknown = IUnknown::try_from(value).map_err(conversion)?;
            let dispatch: IDispatch = unknown
                .cast()
                .map_err(|e| com_error("QueryInterface", e))?;
            Variant::Object(Rc::new(ComObject::new(dispatch)))
        }
        VT_ERROR => {
            // Cell errors are reported as 0x800A0000 | error number.
            let scode = unsafe { value.as_raw().Anonymous.Anonymous.Anonymous.scode };
            Variant::Error(scode & 0xFFFF)
        }
        other => {
            return Err(BridgeError::from_backend(
                BACKEND,
                format!("unsupported variant type {}", other.0),
            ));
        }
    })
}

/// Attach to a running host application, or launch one.
pub(crate) fn attach(show: bool) -> Result<ComObject> {
    let unavailable = |context: &str, e: windows::core::Error| {
        BridgeError::BackendUnavailable(format!("{context}: {e}"))
    };
    let clsid = unsafe { CLSIDFromProgID(w!("Excel.Application")) }
        .map_err(|e| unavailable("host application is not registered", e))?;

    let mut running: Option<IUnknown> = None;
    if unsafe { GetActiveObject(&clsid, None, &mut running) }.is_ok()
        && let Some(dispatch) = running.and_then(|u| u.cast::<IDispatch>().ok())
    {
        debug!("attached to running host application");
        return Ok(ComObject::new(dispatch));
    }

    let dispatch: IDispatch = unsafe { CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER) }
        .map_err(|e| unavailable("failed to launch host application", e))?;
    let app = ComObject::new(dispatch);
    if show {
        app.put("Visible", &[], Variant::Bool(true))?;
    }
    debug!(visible = show, "launched host application");
    Ok(app)
}
