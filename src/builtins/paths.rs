use super::{arg1, arg2, arg3, Registry};
use crate::index::{index, slice};
use crate::path::{del_paths, get_path, set_path};

pub fn register(registry: &mut Registry) {
    registry.register(arg2("setpath", |v, p, x| set_path(v.clone(), p, x.clone())));
    registry.register(arg1("getpath", get_path));
    registry.register(arg1("delpaths", |v, ps| del_paths(v.clone(), ps)));
    // `_index(container; selector)` and `_slice(container; end; start)`;
    // the piped input is not used
    registry.register(arg2("_index", |_, v, x| index(v, x)));
    registry.register(arg3("_slice", |_, v, end, start| slice(v, end, start)));
}
