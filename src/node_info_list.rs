//! Enumeration result lists.

use crate::ffi;
use crate::node_info::NodeInfo;
use crate::resource::Owned;
use crate::Result;

fn release_list(handle: ffi::XnNodeInfoListHandle) {
    unsafe { ffi::xnNodeInfoListFree(handle) }
}

/// List of node descriptors returned by an enumeration call. Owns the
/// native list; the [`NodeInfo`] items it yields borrow from it.
pub struct NodeInfoList {
    owned: Owned<ffi::XnNodeInfoListHandle>,
}

impl NodeInfoList {
    pub(crate) fn from_native(handle: ffi::XnNodeInfoListHandle) -> Result<Self> {
        Ok(Self {
            owned: Owned::open(handle, release_list)?,
        })
    }

    pub fn iter(&self) -> NodeInfoIter<'_> {
        let it = match self.owned.get() {
            Ok(handle) => unsafe { ffi::xnNodeInfoListGetFirst(handle) },
            // A closed list yields nothing rather than resurrecting the handle.
            Err(_) => ffi::XnNodeInfoListIterator {
                current: std::ptr::null_mut(),
            },
        };
        NodeInfoIter { it, _list: self }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Idempotent; frees the native list on the first call.
    pub fn close(&mut self) {
        self.owned.close();
    }
}

pub struct NodeInfoIter<'a> {
    it: ffi::XnNodeInfoListIterator,
    _list: &'a NodeInfoList,
}

impl<'a> Iterator for NodeInfoIter<'a> {
    type Item = NodeInfo;

    fn next(&mut self) -> Option<NodeInfo> {
        unsafe {
            if ffi::xnNodeInfoListIteratorIsValid(self.it) == ffi::XN_FALSE {
                return None;
            }
            let info = ffi::xnNodeInfoListGetCurrent(self.it);
            self.it = ffi::xnNodeInfoListGetNext(self.it);
            NodeInfo::from_native(info).ok()
        }
    }
}
