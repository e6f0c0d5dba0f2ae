// ==========================================
// 产能场景仿真系统 - 覆盖暂存
// ==========================================
// 职责: 待定单品覆盖 + 中心班次配置的内存集合
// 红线: 每个覆盖键至多一条记录 (按键 upsert)
// 红线: 加载任何场景 (含 base) 必须 clear()
// ==========================================

use crate::domain::overrides::{CenterConfig, CenterConfigMap, ItemOverride, OverrideKey};

// ==========================================
// OverrideStore - 覆盖暂存
// ==========================================
/// 会话内待定编辑的唯一容器
///
/// 覆盖列表保持插入顺序, upsert 原位替换同键条目;
/// 中心配置缺失条目表示继承全局默认。
#[derive(Debug, Clone, Default)]
pub struct OverrideStore {
    overrides: Vec<ItemOverride>,
    center_configs: CenterConfigMap,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 单品覆盖操作
    // ==========================================

    /// 插入或替换覆盖
    ///
    /// 存在同键 (article_id, origin_center_id) 条目时原位整体替换,
    /// 否则追加到尾部。相同内容重复调用幂等。
    pub fn upsert(&mut self, item: ItemOverride) {
        let key = item.key();
        match self.overrides.iter_mut().find(|o| o.key() == key) {
            Some(existing) => *existing = item,
            None => self.overrides.push(item),
        }
    }

    /// 按键删除覆盖
    ///
    /// 键不存在时为无操作, 返回 false
    pub fn remove(&mut self, key: &OverrideKey) -> bool {
        let before = self.overrides.len();
        self.overrides.retain(|o| o.key() != *key);
        self.overrides.len() != before
    }

    /// 按键查找覆盖
    pub fn get(&self, key: &OverrideKey) -> Option<&ItemOverride> {
        self.overrides.iter().find(|o| o.key() == *key)
    }

    /// 覆盖列表只读视图
    pub fn list(&self) -> &[ItemOverride] {
        &self.overrides
    }

    /// 覆盖列表快照 (序列化进重算请求)
    pub fn snapshot(&self) -> Vec<ItemOverride> {
        self.overrides.clone()
    }

    // ==========================================
    // 中心班次配置操作
    // ==========================================

    /// 设置工作中心班次配置
    ///
    /// shift_hours 为 None 时删除条目 (回退到继承全局默认)
    pub fn set_center_config(&mut self, center_id: &str, shift_hours: Option<u32>) {
        match shift_hours {
            Some(shifts) => {
                self.center_configs
                    .insert(center_id.to_string(), CenterConfig { shifts });
            }
            None => {
                self.center_configs.remove(center_id);
            }
        }
    }

    /// 查询工作中心班次配置
    pub fn center_config(&self, center_id: &str) -> Option<u32> {
        self.center_configs.get(center_id).map(|c| c.shifts)
    }

    /// 中心配置只读视图
    pub fn list_center_configs(&self) -> &CenterConfigMap {
        &self.center_configs
    }

    /// 中心配置快照
    pub fn snapshot_center_configs(&self) -> CenterConfigMap {
        self.center_configs.clone()
    }

    // ==========================================
    // 整体操作
    // ==========================================

    /// 清空覆盖与中心配置 (场景加载/重置时调用)
    pub fn clear(&mut self) {
        self.overrides.clear();
        self.center_configs.clear();
    }

    /// 覆盖与中心配置是否均为空
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.center_configs.is_empty()
    }

    /// 覆盖条目数
    pub fn len(&self) -> usize {
        self.overrides.len()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn override_with_oee(article: &str, center: &str, oee: f64) -> ItemOverride {
        let mut ov = ItemOverride::new(article, center);
        ov.oee = Some(oee);
        ov
    }

    #[test]
    fn upsert_replaces_same_key_in_place() {
        let mut store = OverrideStore::new();
        store.upsert(override_with_oee("A1", "C1", 0.80));
        store.upsert(override_with_oee("A2", "C1", 0.70));
        // 同键替换, 不追加
        store.upsert(override_with_oee("A1", "C1", 0.95));

        assert_eq!(store.len(), 2);
        // 原位替换保持顺序
        assert_eq!(store.list()[0].article_id, "A1");
        assert_eq!(store.list()[0].oee, Some(0.95));
    }

    #[test]
    fn upsert_is_idempotent_for_identical_content() {
        let mut store = OverrideStore::new();
        store.upsert(override_with_oee("A1", "C1", 0.80));
        store.upsert(override_with_oee("A1", "C1", 0.80));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn same_article_different_origin_center_is_distinct_key() {
        let mut store = OverrideStore::new();
        store.upsert(override_with_oee("A1", "C1", 0.80));
        store.upsert(override_with_oee("A1", "C2", 0.80));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let mut store = OverrideStore::new();
        store.upsert(override_with_oee("A1", "C1", 0.80));
        assert!(!store.remove(&OverrideKey::new("A9", "C9")));
        assert_eq!(store.len(), 1);
        assert!(store.remove(&OverrideKey::new("A1", "C1")));
        assert!(store.is_empty());
    }

    #[test]
    fn noop_override_still_upserts() {
        let mut store = OverrideStore::new();
        let ov = ItemOverride::new("A1", "C1");
        assert!(ov.is_noop());
        store.upsert(ov);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn center_config_none_deletes_entry() {
        let mut store = OverrideStore::new();
        store.set_center_config("C1", Some(8));
        assert_eq!(store.center_config("C1"), Some(8));
        store.set_center_config("C1", None);
        assert_eq!(store.center_config("C1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_both_containers() {
        let mut store = OverrideStore::new();
        store.upsert(override_with_oee("A1", "C1", 0.80));
        store.set_center_config("C1", Some(24));

        store.clear();

        assert!(store.list().is_empty());
        assert!(store.list_center_configs().is_empty());
        assert!(store.is_empty());
    }
}
