use iftraf_stubs::InterfaceCounters;

use crate::error::IftrafError;

/// Full width per interface statistics from the interface mib. Not subject
/// to the 4 GiB truncation of the embedded counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedInterfaceData {
  pub index: u16,
  pub counters: InterfaceCounters,
}

/// Secondary counter source, queried once per interface by its index.
pub trait ExtendedSource {
  fn query(&self, index: u16) -> Result<ExtendedInterfaceData, IftrafError>;
}

/// The kernel interface mib, reached through `sysctl`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfMib;

#[cfg(target_os = "macos")]
mod darwin {
  use std::io;
  use std::os::raw::{c_int, c_void};

  use iftraf_stubs::InterfaceCounters;

  use super::ExtendedInterfaceData;
  use crate::error::IftrafError;
  use crate::routing::read_u64;

  // Second level names not exported by libc.
  const NET_RT_IFLIST2: c_int = 6;
  const NETLINK_GENERIC: c_int = 0;
  const IFMIB_IFDATA: c_int = 2;
  const IFDATA_GENERAL: c_int = 1;

  // `struct ifmibdata`: a 16 byte name, five u32 fields, four u32 of
  // filler, then `if_data64` aligned up to offset 56.
  const IFMD_DATA: usize = 56;
  const IFMD_SIZE: usize = IFMD_DATA + 128;
  const IFMD_IPACKETS: usize = IFMD_DATA + 24;
  const IFMD_OPACKETS: usize = IFMD_DATA + 40;
  const IFMD_IBYTES: usize = IFMD_DATA + 64;
  const IFMD_OBYTES: usize = IFMD_DATA + 72;

  /// Fetch the routing table interface list as one raw buffer. The first
  /// call sizes the buffer, the second fills it.
  pub fn fetch_iflist2() -> Result<Vec<u8>, IftrafError> {
    let mut mib: [c_int; 6] =
      [libc::CTL_NET, libc::PF_ROUTE, 0, 0, NET_RT_IFLIST2, 0];
    let mut len: libc::size_t = 0;
    let rc = unsafe {
      libc::sysctl(
        mib.as_mut_ptr(),
        6,
        std::ptr::null_mut(),
        &mut len,
        std::ptr::null_mut(),
        0,
      )
    };
    if rc < 0 {
      return Err(IftrafError::Fetch(io::Error::last_os_error()));
    }
    let mut buf = vec![0u8; len];
    let rc = unsafe {
      libc::sysctl(
        mib.as_mut_ptr(),
        6,
        buf.as_mut_ptr() as *mut c_void,
        &mut len,
        std::ptr::null_mut(),
        0,
      )
    };
    if rc < 0 {
      return Err(IftrafError::Fetch(io::Error::last_os_error()));
    }
    // The table can shrink between the two calls.
    buf.truncate(len);
    Ok(buf)
  }

  pub fn query_ifmib(index: u16) -> Result<ExtendedInterfaceData, IftrafError> {
    let mut mib: [c_int; 6] = [
      libc::CTL_NET,
      libc::PF_LINK,
      NETLINK_GENERIC,
      IFMIB_IFDATA,
      c_int::from(index),
      IFDATA_GENERAL,
    ];
    let mut data = [0u8; IFMD_SIZE];
    let mut len: libc::size_t = IFMD_SIZE;
    let rc = unsafe {
      libc::sysctl(
        mib.as_mut_ptr(),
        6,
        data.as_mut_ptr() as *mut c_void,
        &mut len,
        std::ptr::null_mut(),
        0,
      )
    };
    if rc < 0 {
      return Err(IftrafError::ExtendedQuery {
        index,
        source: io::Error::last_os_error(),
      });
    }
    Ok(ExtendedInterfaceData {
      index,
      counters: InterfaceCounters {
        input_packets: read_u64(&data, IFMD_IPACKETS),
        output_packets: read_u64(&data, IFMD_OPACKETS),
        input_bytes: read_u64(&data, IFMD_IBYTES),
        output_bytes: read_u64(&data, IFMD_OBYTES),
      },
    })
  }
}

#[cfg(target_os = "macos")]
pub fn fetch_iflist2() -> Result<Vec<u8>, IftrafError> {
  darwin::fetch_iflist2()
}

#[cfg(target_os = "macos")]
impl ExtendedSource for IfMib {
  fn query(&self, index: u16) -> Result<ExtendedInterfaceData, IftrafError> {
    darwin::query_ifmib(index)
  }
}

#[cfg(not(target_os = "macos"))]
pub fn fetch_iflist2() -> Result<Vec<u8>, IftrafError> {
  Err(IftrafError::Fetch(unsupported()))
}

#[cfg(not(target_os = "macos"))]
impl ExtendedSource for IfMib {
  fn query(&self, index: u16) -> Result<ExtendedInterfaceData, IftrafError> {
    Err(IftrafError::ExtendedQuery {
      index,
      source: unsupported(),
    })
  }
}

#[cfg(not(target_os = "macos"))]
fn unsupported() -> std::io::Error {
  std::io::Error::new(
    std::io::ErrorKind::Unsupported,
    "the routing interface list sysctl is only available on macos",
  )
}
