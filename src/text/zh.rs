//! Simplified/Traditional Chinese character mapping.
//!
//! The table covers the characters that show up in BOM vocabulary, status
//! labels and common personnel surnames. It is intentionally limited to
//! one-to-one pairs so that converting in either direction is loss-free for
//! the covered set; characters outside the table pass through unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

/// (simplified, traditional) pairs. Every simplified character and every
/// traditional character appears at most once, so the reverse map is the
/// exact inverse of the forward map.
const CHAR_PAIRS: &[(char, char)] = &[
    // Engineering and BOM vocabulary
    ('数', '數'),
    ('号', '號'),
    ('状', '狀'),
    ('态', '態'),
    ('换', '換'),
    ('绑', '綁'),
    ('库', '庫'),
    ('单', '單'),
    ('价', '價'),
    ('电', '電'),
    ('线', '線'),
    ('缆', '纜'),
    ('组', '組'),
    ('总', '總'),
    ('计', '計'),
    ('页', '頁'),
    ('机', '機'),
    ('关', '關'),
    ('开', '開'),
    ('项', '項'),
    ('类', '類'),
    ('别', '別'),
    ('备', '備'),
    ('图', '圖'),
    ('纸', '紙'),
    ('规', '規'),
    ('说', '說'),
    ('书', '書'),
    ('变', '變'),
    ('记', '記'),
    ('录', '錄'),
    ('证', '證'),
    ('签', '簽'),
    ('审', '審'),
    ('节', '節'),
    ('标', '標'),
    ('准', '準'),
    ('产', '產'),
    ('设', '設'),
    ('试', '試'),
    ('验', '驗'),
    ('质', '質'),
    ('检', '檢'),
    ('测', '測'),
    ('报', '報'),
    ('预', '預'),
    ('订', '訂'),
    ('购', '購'),
    ('销', '銷'),
    ('货', '貨'),
    ('运', '運'),
    ('输', '輸'),
    ('进', '進'),
    ('连', '連'),
    ('续', '續'),
    ('维', '維'),
    ('护', '護'),
    ('损', '損'),
    ('坏', '壞'),
    ('废', '廢'),
    ('旧', '舊'),
    ('归', '歸'),
    ('属', '屬'),
    ('权', '權'),
    ('责', '責'),
    ('务', '務'),
    ('员', '員'),
    ('级', '級'),
    ('层', '層'),
    ('阶', '階'),
    ('领', '領'),
    ('导', '導'),
    ('经', '經'),
    ('专', '專'),
    ('业', '業'),
    ('术', '術'),
    ('师', '師'),
    ('长', '長'),
    ('队', '隊'),
    ('织', '織'),
    ('构', '構'),
    ('体', '體'),
    ('统', '統'),
    ('称', '稱'),
    ('编', '編'),
    ('码', '碼'),
    ('识', '識'),
    ('读', '讀'),
    ('写', '寫'),
    ('错', '錯'),
    ('误', '誤'),
    ('问', '問'),
    ('题', '題'),
    ('请', '請'),
    ('应', '應'),
    ('确', '確'),
    ('认', '認'),
    ('该', '該'),
    ('详', '詳'),
    ('细', '細'),
    ('释', '釋'),
    ('义', '義'),
    ('译', '譯'),
    ('语', '語'),
    ('简', '簡'),
    ('汉', '漢'),
    ('词', '詞'),
    ('风', '風'),
    ('云', '雲'),
    ('气', '氣'),
    ('压', '壓'),
    ('热', '熱'),
    ('温', '溫'),
    ('湿', '濕'),
    ('环', '環'),
    ('尘', '塵'),
    ('净', '淨'),
    ('滤', '濾'),
    ('阀', '閥'),
    ('门', '門'),
    ('块', '塊'),
    ('钢', '鋼'),
    ('铁', '鐵'),
    ('铜', '銅'),
    ('铝', '鋁'),
    ('锌', '鋅'),
    ('镀', '鍍'),
    ('钉', '釘'),
    ('丝', '絲'),
    ('垫', '墊'),
    ('轴', '軸'),
    ('齿', '齒'),
    ('轮', '輪'),
    ('带', '帶'),
    ('链', '鏈'),
    ('绳', '繩'),
    ('网', '網'),
    ('壳', '殼'),
    ('盖', '蓋'),
    ('柜', '櫃'),
    ('头', '頭'),
    ('侧', '側'),
    ('边', '邊'),
    ('内', '內'),
    ('后', '後'),
    ('时', '時'),
    ('间', '間'),
    ('历', '歷'),
    ('执', '執'),
    ('满', '滿'),
    ('键', '鍵'),
    ('调', '調'),
    ('余', '餘'),
    ('发', '發'),
    // Function words and measures
    ('两', '兩'),
    ('个', '個'),
    ('万', '萬'),
    ('亿', '億'),
    ('几', '幾'),
    ('无', '無'),
    ('没', '沒'),
    ('为', '為'),
    ('与', '與'),
    ('从', '從'),
    ('对', '對'),
    ('于', '於'),
    ('并', '並'),
    ('则', '則'),
    ('将', '將'),
    ('现', '現'),
    ('当', '當'),
    ('这', '這'),
    ('样', '樣'),
    ('种', '種'),
    ('条', '條'),
    ('只', '隻'),
    ('双', '雙'),
    // Common surnames
    ('张', '張'),
    ('刘', '劉'),
    ('陈', '陳'),
    ('杨', '楊'),
    ('黄', '黃'),
    ('吴', '吳'),
    ('赵', '趙'),
    ('孙', '孫'),
    ('马', '馬'),
    ('罗', '羅'),
    ('郑', '鄭'),
    ('谢', '謝'),
    ('韩', '韓'),
    ('冯', '馮'),
    ('邓', '鄧'),
    ('萧', '蕭'),
    ('蒋', '蔣'),
    ('叶', '葉'),
    ('苏', '蘇'),
    ('吕', '呂'),
    ('卢', '盧'),
    ('钟', '鍾'),
    ('谭', '譚'),
    ('陆', '陸'),
    ('范', '範'),
    ('韦', '韋'),
    ('贾', '賈'),
    ('邹', '鄒'),
    ('闫', '閆'),
    ('龙', '龍'),
    ('贺', '賀'),
    ('顾', '顧'),
    ('龚', '龔'),
    ('钱', '錢'),
    ('严', '嚴'),
    ('汤', '湯'),
];

static TO_SIMPLIFIED: LazyLock<HashMap<char, char>> =
    LazyLock::new(|| CHAR_PAIRS.iter().map(|&(s, t)| (t, s)).collect());

static TO_TRADITIONAL: LazyLock<HashMap<char, char>> =
    LazyLock::new(|| CHAR_PAIRS.iter().copied().collect());

/// Maps every covered traditional character to its simplified form.
pub fn to_simplified(text: &str) -> String {
    text.chars()
        .map(|c| *TO_SIMPLIFIED.get(&c).unwrap_or(&c))
        .collect()
}

/// Maps every covered simplified character to its traditional form.
pub fn to_traditional(text: &str) -> String {
    text.chars()
        .map(|c| *TO_TRADITIONAL.get(&c).unwrap_or(&c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_one_to_one() {
        let simplified: HashSet<char> = CHAR_PAIRS.iter().map(|&(s, _)| s).collect();
        let traditional: HashSet<char> = CHAR_PAIRS.iter().map(|&(_, t)| t).collect();
        assert_eq!(simplified.len(), CHAR_PAIRS.len());
        assert_eq!(traditional.len(), CHAR_PAIRS.len());
    }

    #[test]
    fn conversion_round_trips_for_covered_text() {
        let labels = ["数量", "剩余物料", "执行统计", "替换料号"];
        for label in labels {
            let traditional = to_traditional(label);
            assert_ne!(traditional, label);
            assert_eq!(to_simplified(&traditional), label);
        }
    }

    #[test]
    fn uncovered_characters_pass_through() {
        assert_eq!(to_simplified("ABC-123 料"), "ABC-123 料");
        assert_eq!(to_traditional("ABC-123 料"), "ABC-123 料");
    }
}
