//! Review prompt templates.
//!
//! The prompts instruct the model to return a single JSON object with a
//! verdict and a findings list. Position accuracy is requested explicitly,
//! but the model reasons over tokens and gets character offsets wrong
//! anyway; the reconciliation engine repairs them afterwards.

pub const REVIEW_SYSTEM: &str = "あなたは薬機法審査の専門家です。\
提供されたキャプションを厳密に審査し、JSON形式で結果を返してください。";

/// Build the user prompt from the knowledge digest and the caption.
pub fn review_prompt(knowledge_digest: &str, caption: &str) -> String {
    format!(
        "あなたは化粧品広告の薬機法（薬機法）審査の専門家です。\n\
以下のナレッジベースを参照して、提供されたキャプション本文を厳密に審査してください。\n\
\n\
## ナレッジベース（薬機法違反の可能性がある表現とルール）\n\
\n\
{knowledge_digest}\n\
\n\
## 審査対象のキャプション\n\
\n\
{caption}\n\
\n\
## 審査タスク\n\
\n\
1. **詳細な検索**: キャプション本文内で、ナレッジベースに記載されているNG表現が含まれているかチェックしてください\n\
   - 各表現の「検索パターン」を参照して、部分一致も含めて検出してください\n\
   - 例：「明るい」「明るく」「明るさ」「明るかった」「明るくない」など、すべてのバリエーションを検出\n\
\n\
2. **コンテキストの考慮**: \n\
   - キャプションが「感想・口コミ」的な表現か「商品説明」的な表現かを判断してください\n\
   - ナレッジベースの「感想・口コミコンテキスト」と「商品説明コンテキスト」を参照し、適切に判定してください\n\
   - コンテキストによってはOK表現の場合もあるため、慎重に判断してください\n\
\n\
3. **正確な位置特定**: \n\
   - 検出されたNG表現について、キャプション本文内での正確な開始位置と終了位置を特定してください\n\
   - 文字数は0から始まるインデックスで指定してください\n\
   - **重要**: matchedTextは、キャプション本文内のposition.startからposition.endまでのテキストと完全に一致する必要があります\n\
   - 例：キャプションが「朝はふんわり、夜はしっとり」の場合、「ふんわり」を検出したら、matchedText: \"ふんわり\"、position: {{ start: 2, end: 6 }}と正確に指定してください\n\
\n\
4. **詳細な情報提供**: \n\
   - 表現名（ナレッジベースの「表現」フィールド）\n\
   - 該当箇所のテキスト（matchedText）: キャプション内の該当部分を**完全に一致する形で**抽出してください\n\
   - 理由（ナレッジベースの「ルール」フィールドの内容）\n\
   - 位置（position.startとposition.end）: matchedTextの文字列がキャプション内のposition.startからposition.endまでの範囲と完全に一致するように設定してください\n\
\n\
## 重要な注意事項\n\
\n\
- コンテキストによっては同じ表現でもOKの場合があります（例：メーキャップ効果の場合）\n\
- 部分一致も含めて、すべてのバリエーションを検出してください\n\
- **位置情報は正確に特定してください（文字列のインデックス）**\n\
- **matchedTextとpositionは完全に一致する必要があります**\n\
- ナレッジベースのルールとコンテキスト情報を詳細に参照してください\n\
- 改行文字や空白文字も含めて、正確な位置を特定してください\n\
\n\
## 出力形式\n\
\n\
以下のJSON形式で回答してください：\n\
\n\
```json\n\
{{\n\
  \"passed\": false,\n\
  \"issues\": [\n\
    {{\n\
      \"name\": \"表現名\",\n\
      \"matchedText\": \"キャプション内の該当部分\",\n\
      \"reason\": \"NG理由（ルールの内容）\",\n\
      \"position\": {{\n\
        \"start\": 開始位置（0から始まる文字インデックス）,\n\
        \"end\": 終了位置（0から始まる文字インデックス）\n\
      }}\n\
    }}\n\
  ]\n\
}}\n\
```\n\
\n\
NG表現が1つも検出されない場合は、`\"passed\": true, \"issues\": []` を返してください。\n\
必ず有効なJSON形式で回答してください。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_digest_and_caption() {
        let prompt = review_prompt("【表現: 明るい】", "朝はふんわり");
        assert!(prompt.contains("【表現: 明るい】"));
        assert!(prompt.contains("朝はふんわり"));
        assert!(prompt.contains("\"passed\""));
        assert!(prompt.contains("matchedText"));
    }
}
