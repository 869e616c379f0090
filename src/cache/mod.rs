//! 对象缓存
//!
//! 缓存后端以插件形式注册（见 [`declare_object_cache_plugin!`]），启动时按
//! `cache.type` 选择。当前内置 Moka 内存缓存。

pub mod object_cache;
pub mod register;
mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明并在进程启动时注册一个缓存插件
///
/// 插件类型需要提供 `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $ty:ident) => {
        paste::paste! {
            #[ctor::ctor]
            unsafe fn [<__register_ $ty:snake>]() {
                $crate::cache::register::register_object_cache_plugin(
                    $name,
                    std::sync::Arc::new(|| {
                        Box::pin(async {
                            let cache = $ty::new()
                                .map_err($crate::errors::LmsError::cache_connection)?;
                            Ok::<Box<dyn $crate::cache::ObjectCache>, $crate::errors::LmsError>(
                                Box::new(cache),
                            )
                        }) as $crate::cache::register::BoxedObjectCacheFuture
                    }),
                );
            }
        }
    };
}
