//! # Images 模块
//!
//! 按效果名解析默认贴图集合。
//!
//! 宿主在启动时把资源清单（图片路径列表）交给 [`ImageLibrary`]，
//! 路径按前缀分成项目贴图与内置效果贴图两组；查询时项目贴图
//! 优先，内置贴图兜底。查不到返回空集合：缺图不是错误，
//! 配方必须容忍空贴图集，单个效果缺资源不会打断帧循环。

/// 内置效果贴图的路径前缀
pub const DEFAULT_PATH: &str = "addons/effects/images/";
/// 项目自有贴图的路径前缀
pub const PROJECT_PATH: &str = "resources/images/";

/// 贴图解析器
#[derive(Debug, Clone, Default)]
pub struct ImageLibrary {
    /// 内置效果贴图
    effect_images: Vec<String>,
    /// 项目自有贴图
    project_images: Vec<String>,
}

impl ImageLibrary {
    /// 创建空解析器（所有查询返回空）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从资源清单构建，按前缀分组
    ///
    /// 不属于任一前缀的路径被忽略。
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lib = Self::new();
        for path in paths {
            let path = path.into();
            if path.contains(DEFAULT_PATH) {
                lib.effect_images.push(path);
            } else if path.contains(PROJECT_PATH) {
                lib.project_images.push(path);
            }
        }
        lib
    }

    /// 解析某个效果组的贴图集合
    ///
    /// 匹配路径中含 `/{group}` 片段的项目贴图；项目组为空时
    /// 回退到内置贴图。没有任何匹配时返回空集合。
    pub fn get(&self, group: &str) -> Vec<String> {
        let needle = format!("/{group}");

        let matches = |set: &[String]| -> Vec<String> {
            set.iter()
                .filter(|url| url.contains(&needle))
                .cloned()
                .collect()
        };

        let available = matches(&self.project_images);
        if !available.is_empty() {
            return available;
        }
        matches(&self.effect_images)
    }

    /// 解析单张贴图
    ///
    /// 返回路径中含 `fragment` 的最后一张项目贴图，项目组没有
    /// 匹配时回退到内置贴图；都没有时返回 `None`。
    pub fn get_image(&self, fragment: &str) -> Option<String> {
        let find_last = |set: &[String]| -> Option<String> {
            set.iter().filter(|url| url.contains(fragment)).next_back().cloned()
        };

        find_last(&self.project_images).or_else(|| find_last(&self.effect_images))
    }

    /// 贴图总数
    pub fn len(&self) -> usize {
        self.effect_images.len() + self.project_images.len()
    }

    /// 是否没有任何贴图
    pub fn is_empty(&self) -> bool {
        self.effect_images.is_empty() && self.project_images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> ImageLibrary {
        ImageLibrary::from_paths([
            "addons/effects/images/explode/flame_01.png",
            "addons/effects/images/explode/flame_02.png",
            "addons/effects/images/sparkle/glint.png",
            "addons/effects/images/disco/darker.png",
            "addons/effects/images/disco/light_red.png",
            "addons/effects/images/disco/light_blue.png",
            "resources/images/explode/custom_shard.png",
            "other/path/ignored.png",
        ])
    }

    #[test]
    fn test_project_images_take_priority() {
        let lib = library();
        let images = lib.get("explode");
        // 项目里有 explode 贴图：只返回项目组
        assert_eq!(images, vec!["resources/images/explode/custom_shard.png"]);
    }

    #[test]
    fn test_fallback_to_effect_images() {
        let lib = library();
        let images = lib.get("sparkle");
        assert_eq!(images, vec!["addons/effects/images/sparkle/glint.png"]);
    }

    #[test]
    fn test_missing_group_yields_empty() {
        let lib = library();
        assert!(lib.get("confetti").is_empty());
        assert!(ImageLibrary::new().get("explode").is_empty());
    }

    #[test]
    fn test_get_image_fragment() {
        let lib = library();
        assert_eq!(
            lib.get_image("disco/darker"),
            Some("addons/effects/images/disco/darker.png".to_string())
        );
        assert_eq!(lib.get_image("no/such"), None);
    }

    #[test]
    fn test_unrelated_paths_ignored() {
        let lib = library();
        assert_eq!(lib.len(), 7);
    }

    #[test]
    fn test_group_subpath_matching() {
        let lib = library();
        let lights = lib.get("disco/light");
        assert_eq!(lights.len(), 2);
    }
}
