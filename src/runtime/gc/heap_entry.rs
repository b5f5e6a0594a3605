use crate::runtime::gc::heap_object::HeapObject;

pub struct HeapEntry {
    pub(crate) object: HeapObject,
    pub(crate) marked: bool,
}
