mod list;
mod render;
mod validate;

pub(crate) use list::cmd_list;
pub(crate) use render::cmd_render;
pub(crate) use validate::cmd_validate;
